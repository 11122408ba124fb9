//! FinSmart Web Server
//!
//! Axum-based REST API for the FinSmart personal finance tracker.
//!
//! - JSON endpoints for calculators, expenses, budgets, planning, alerts and
//!   gamification under `/api`
//! - Restrictive CORS policy
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use finsmart_core::{LogGateway, Settings, SmsGateway, Store};

mod handlers;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub settings: Settings,
    /// Delivery channel for budget alerts
    pub gateway: Arc<dyn SmsGateway>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, settings: Settings) -> Self {
        Self {
            store,
            settings,
            gateway: Arc::new(LogGateway),
        }
    }

    /// Use a different SMS gateway
    pub fn with_gateway(mut self, gateway: Arc<dyn SmsGateway>) -> Self {
        self.gateway = gateway;
        self
    }
}

/// Simple success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Today's date on the server
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Create the application router
pub fn create_router(state: AppState, config: ServerConfig) -> Router {
    let state = Arc::new(state);

    let api_routes = Router::new()
        // Calculators
        .route("/calculators/lumpsum", post(handlers::calc_lumpsum))
        .route("/calculators/sip", post(handlers::calc_sip))
        .route("/calculators/step-up", post(handlers::calc_step_up))
        .route("/calculators/goal", post(handlers::calc_goal))
        .route("/calculators/retirement", post(handlers::calc_retirement))
        // Expenses
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        // Budgets
        .route(
            "/budgets",
            get(handlers::list_budgets).put(handlers::set_budget),
        )
        .route("/budgets/status", get(handlers::budget_status))
        .route("/budgets/allocate", post(handlers::allocate_budget))
        .route("/budgets/:name", delete(handlers::remove_budget))
        // Planner
        .route("/planner/weekly", post(handlers::plan_week))
        // Alerts
        .route("/alerts", get(handlers::list_alerts))
        .route("/alerts/send", post(handlers::send_alerts))
        // Gamification
        .route("/gamification", get(handlers::get_profile))
        .route("/activities", post(handlers::record_activity));

    // Build CORS layer
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Start the server
pub async fn serve(
    store: Arc<dyn Store>,
    settings: Settings,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    serve_with_config(store, settings, host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    store: Arc<dyn Store>,
    settings: Settings,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let app = create_router(AppState::new(store, settings), config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        // Caller mistakes are reported as-is; everything else stays server-side
        match err.downcast_ref::<finsmart_core::Error>() {
            Some(finsmart_core::Error::InvalidInput(msg)) => Self::bad_request(msg),
            Some(finsmart_core::Error::NotFound(msg)) => Self::not_found(msg),
            _ => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                message: "An internal error occurred".to_string(),
                // Keep full error for logging
                internal: Some(err),
            },
        }
    }
}

#[cfg(test)]
mod tests;
