//! Budget handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{today, AppError, AppState, SuccessResponse};
use finsmart_core::{
    record_under_budget, BudgetAllocator, BudgetCategory, BudgetPeriod, BudgetSummary,
    CategoryStatus, SpendingPace,
};

/// GET /api/budgets - Stored budgets, or the configured defaults when none are stored
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BudgetCategory>>, AppError> {
    let budgets = state.settings.effective_budgets(state.store.budgets()?);
    Ok(Json(budgets))
}

/// PUT /api/budgets - Create or replace a budget
pub async fn set_budget(
    State(state): State<Arc<AppState>>,
    Json(budget): Json<BudgetCategory>,
) -> Result<Json<SuccessResponse>, AppError> {
    budget.validate()?;
    state.store.set_budget(budget)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /api/budgets/:name
pub async fn remove_budget(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.store.remove_budget(&name)?;
    Ok(Json(SuccessResponse { success: true }))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// Report as of this date instead of today
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct BudgetStatusResponse {
    pub as_of: NaiveDate,
    pub categories: Vec<CategoryStatus>,
    /// Spend in categories without a budget this month
    pub unbudgeted: BTreeMap<String, f64>,
    pub summary: BudgetSummary,
    /// Monthly budgets and unbudgeted spend only
    pub pace: SpendingPace,
}

/// GET /api/budgets/status - Budget vs. actual for the current period
pub async fn budget_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatusQuery>,
) -> Result<Json<BudgetStatusResponse>, AppError> {
    let as_of = params.date.unwrap_or_else(today);
    let budgets = state.settings.effective_budgets(state.store.budgets()?);
    let allocator = BudgetAllocator::tracking(&budgets, &state.store.expenses()?, as_of)?;

    let summary = allocator.summary();
    let pace = allocator.monthly_pace(as_of);

    let logged = record_under_budget(state.store.as_ref(), &allocator, as_of)?;
    debug!(logged, "Recorded under-budget categories");

    Ok(Json(BudgetStatusResponse {
        as_of,
        categories: allocator.status(),
        unbudgeted: allocator.unbudgeted().clone(),
        summary,
        pace,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CategoryWeight {
    pub category: String,
    pub weight: f64,
}

#[derive(Debug, Deserialize)]
pub struct AllocateRequest {
    pub total: f64,
    pub weights: Vec<CategoryWeight>,
    /// Store the resulting limits as monthly budgets
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize)]
pub struct Allocation {
    pub category: String,
    pub limit: f64,
}

/// POST /api/budgets/allocate - Split a total across weighted categories
pub async fn allocate_budget(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AllocateRequest>,
) -> Result<Json<Vec<Allocation>>, AppError> {
    let allocator = BudgetAllocator::from_weights(
        req.total,
        req.weights.into_iter().map(|w| (w.category, w.weight)),
    )?;

    let allocations: Vec<Allocation> = allocator
        .categories()
        .map(|category| Allocation {
            category: category.to_string(),
            limit: allocator.limit(category).unwrap_or(0.0),
        })
        .collect();

    if req.save {
        for allocation in &allocations {
            state.store.set_budget(BudgetCategory::new(
                allocation.category.clone(),
                allocation.limit,
                BudgetPeriod::Monthly,
            )?)?;
        }
    }

    Ok(Json(allocations))
}
