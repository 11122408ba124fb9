//! Gamification handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::{AppError, AppState, SuccessResponse};
use finsmart_core::{Activity, GamificationEngine, Profile};

/// GET /api/gamification - Points, level, streaks, badges and challenge progress
pub async fn get_profile(State(state): State<Arc<AppState>>) -> Result<Json<Profile>, AppError> {
    let activities = state.store.activities()?;
    Ok(Json(GamificationEngine::new().evaluate(&activities)))
}

/// POST /api/activities - Log an activity such as a login or a chart view
pub async fn record_activity(
    State(state): State<Arc<AppState>>,
    Json(activity): Json<Activity>,
) -> Result<(StatusCode, Json<SuccessResponse>), AppError> {
    state.store.record_activity(activity)?;
    Ok((StatusCode::CREATED, Json(SuccessResponse { success: true })))
}
