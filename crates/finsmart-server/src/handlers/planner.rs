//! Weekly planner handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use finsmart_core::{DayAmount, PlanInsights, Strategy, WeeklyAllocation, WeeklyPlanner};

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub weekly_total: f64,
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
}

fn default_strategy() -> Strategy {
    Strategy::Equal
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub allocation: WeeklyAllocation,
    /// Monday-first day amounts
    pub days: Vec<DayAmount>,
    pub insights: PlanInsights,
}

/// POST /api/planner/weekly
pub async fn plan_week(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let planner = WeeklyPlanner::with_tolerance(state.settings.planner.custom_tolerance);
    let allocation = planner.plan(req.weekly_total, req.strategy)?;

    Ok(Json(PlanResponse {
        days: allocation.days().collect(),
        insights: allocation.insights(),
        allocation,
    }))
}
