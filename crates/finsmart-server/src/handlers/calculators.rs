//! Investment calculator handlers
//!
//! Rates in requests are fractions (0.12 for 12%). `inflation_rate` is
//! optional everywhere and defaults to zero.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{today, AppError, AppState};
use finsmart_core::finance::{self, Projection, RetirementEstimate, RetirementPlan};
use finsmart_core::{Activity, ActivityKind, CalculatorKind, InvestmentPlan};

fn record_use(state: &AppState, calculator: CalculatorKind) -> Result<(), AppError> {
    state.store.record_activity(Activity::new(
        today(),
        ActivityKind::CalculatorUsed { calculator },
    ))?;
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct LumpsumRequest {
    pub principal: f64,
    pub annual_rate: f64,
    pub years: u32,
    #[serde(default)]
    pub inflation_rate: f64,
}

#[derive(Debug, Deserialize)]
pub struct SipRequest {
    pub monthly_contribution: f64,
    pub annual_rate: f64,
    pub years: u32,
    /// Optional lumpsum invested alongside the SIP
    #[serde(default)]
    pub principal: f64,
    #[serde(default)]
    pub inflation_rate: f64,
}

#[derive(Debug, Deserialize)]
pub struct StepUpRequest {
    pub monthly_contribution: f64,
    pub annual_rate: f64,
    pub years: u32,
    pub step_up_rate: f64,
    #[serde(default)]
    pub inflation_rate: f64,
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    /// In today's money
    pub target: f64,
    pub annual_rate: f64,
    pub years: u32,
    #[serde(default)]
    pub inflation_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub target: f64,
    /// `target` grown by inflation to the goal year; what the SIP aims for
    pub inflation_adjusted_target: f64,
    pub monthly_contribution: f64,
    pub months: u32,
    pub total_invested: f64,
    pub gains: f64,
}

/// POST /api/calculators/lumpsum
pub async fn calc_lumpsum(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LumpsumRequest>,
) -> Result<Json<Projection>, AppError> {
    let projection = InvestmentPlan {
        principal: req.principal,
        monthly_contribution: 0.0,
        annual_rate: req.annual_rate,
        years: req.years,
        step_up_rate: None,
        inflation_rate: req.inflation_rate,
    }
    .project()?;
    record_use(&state, CalculatorKind::Lumpsum)?;
    Ok(Json(projection))
}

/// POST /api/calculators/sip
pub async fn calc_sip(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SipRequest>,
) -> Result<Json<Projection>, AppError> {
    if req.monthly_contribution <= 0.0 {
        return Err(AppError::bad_request(
            "monthly_contribution must be greater than zero",
        ));
    }
    let projection = InvestmentPlan {
        principal: req.principal,
        monthly_contribution: req.monthly_contribution,
        annual_rate: req.annual_rate,
        years: req.years,
        step_up_rate: None,
        inflation_rate: req.inflation_rate,
    }
    .project()?;
    record_use(&state, CalculatorKind::Sip)?;
    Ok(Json(projection))
}

/// POST /api/calculators/step-up
pub async fn calc_step_up(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StepUpRequest>,
) -> Result<Json<Projection>, AppError> {
    if req.monthly_contribution <= 0.0 {
        return Err(AppError::bad_request(
            "monthly_contribution must be greater than zero",
        ));
    }
    let projection = InvestmentPlan {
        principal: 0.0,
        monthly_contribution: req.monthly_contribution,
        annual_rate: req.annual_rate,
        years: req.years,
        step_up_rate: Some(req.step_up_rate),
        inflation_rate: req.inflation_rate,
    }
    .project()?;
    record_use(&state, CalculatorKind::StepUp)?;
    Ok(Json(projection))
}

/// POST /api/calculators/goal
pub async fn calc_goal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GoalRequest>,
) -> Result<Json<GoalResponse>, AppError> {
    let months = req.years.saturating_mul(12);
    let target_then = finance::inflate(req.target, req.inflation_rate, req.years as f64)?;
    let monthly = finance::goal_based_contribution(target_then, req.annual_rate, months)?;
    record_use(&state, CalculatorKind::Goal)?;

    let total_invested = monthly * months as f64;
    Ok(Json(GoalResponse {
        target: req.target,
        inflation_adjusted_target: target_then,
        monthly_contribution: monthly,
        months,
        total_invested,
        gains: target_then - total_invested,
    }))
}

/// POST /api/calculators/retirement
pub async fn calc_retirement(
    State(state): State<Arc<AppState>>,
    Json(plan): Json<RetirementPlan>,
) -> Result<Json<RetirementEstimate>, AppError> {
    let estimate = finance::retirement_corpus(&plan)?;
    record_use(&state, CalculatorKind::Retirement)?;
    Ok(Json(estimate))
}
