//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{AppError, AppState};
use finsmart_core::{DateRange, ExpenseRecord, NewExpense};

/// Query parameters for listing expenses
#[derive(Debug, Deserialize)]
pub struct ExpenseQuery {
    /// YYYY-MM
    pub month: Option<String>,
    pub category: Option<String>,
}

/// GET /api/expenses - List expenses, oldest first
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExpenseQuery>,
) -> Result<Json<Vec<ExpenseRecord>>, AppError> {
    let mut expenses = match params.month.as_deref() {
        Some(month) => {
            let first = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
                .map_err(|_| AppError::bad_request("month must be YYYY-MM"))?;
            state.store.expenses_in(&DateRange::month_of(first))?
        }
        None => state.store.expenses()?,
    };
    if let Some(category) = params.category.as_deref() {
        expenses.retain(|e| e.category.eq_ignore_ascii_case(category));
    }
    Ok(Json(expenses))
}

/// POST /api/expenses - Log an expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Json(expense): Json<NewExpense>,
) -> Result<(StatusCode, Json<ExpenseRecord>), AppError> {
    let record = state.store.add_expense(expense)?;
    Ok((StatusCode::CREATED, Json(record)))
}
