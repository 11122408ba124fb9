//! Budget alert handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{today, AppError, AppState};
use finsmart_core::alerts::{self, BudgetAlert, DispatchReport};
use finsmart_core::BudgetAllocator;

#[derive(Debug, Default, Deserialize)]
pub struct AlertQuery {
    /// Fraction of the limit, defaults to the configured threshold
    pub threshold: Option<f64>,
}

fn current_alerts(state: &AppState, threshold: Option<f64>) -> Result<Vec<BudgetAlert>, AppError> {
    let threshold = threshold.unwrap_or(state.settings.alerts.threshold);
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(AppError::bad_request("threshold must be in (0, 1]"));
    }
    let budgets = state.settings.effective_budgets(state.store.budgets()?);
    let allocator = BudgetAllocator::tracking(&budgets, &state.store.expenses()?, today())?;
    Ok(alerts::evaluate(&allocator, threshold))
}

/// GET /api/alerts - Categories past the alert threshold
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertQuery>,
) -> Result<Json<Vec<BudgetAlert>>, AppError> {
    Ok(Json(current_alerts(&state, params.threshold)?))
}

#[derive(Debug, Default, Deserialize)]
pub struct SendAlertsRequest {
    /// Overrides the configured number
    pub phone_number: Option<String>,
    pub threshold: Option<f64>,
}

/// POST /api/alerts/send - Deliver alerts not yet sent this month
pub async fn send_alerts(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendAlertsRequest>,
) -> Result<Json<DispatchReport>, AppError> {
    let settings = &state.settings.alerts;
    if !settings.enabled && req.phone_number.is_none() {
        return Err(AppError::bad_request("Alerts are disabled"));
    }
    let number = req
        .phone_number
        .as_deref()
        .or(settings.phone_number.as_deref())
        .ok_or_else(|| AppError::bad_request("No phone number configured"))?;
    let number = alerts::normalize_phone(number, &settings.default_country_code)?;

    let found = current_alerts(&state, req.threshold)?;
    let mut ledger = state.store.alert_ledger()?;
    let report = ledger
        .dispatch(
            state.gateway.as_ref(),
            &number,
            &found,
            today(),
            &state.settings.currency,
        )
        .await;
    state.store.save_alert_ledger(&ledger)?;

    Ok(Json(report))
}
