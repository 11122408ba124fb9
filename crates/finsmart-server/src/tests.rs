//! Server API tests

use super::*;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use finsmart_core::{
    Activity, ActivityKind, BudgetCategory, BudgetPeriod, CalculatorKind, MemoryStore, NewExpense,
};
use http_body_util::BodyExt;
use std::sync::Mutex;
use tower::ServiceExt;

fn setup_state() -> (Arc<MemoryStore>, AppState) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), Settings::builtin().unwrap());
    (store, state)
}

fn setup_test_app() -> Router {
    let (_, state) = setup_state();
    create_router(state, ServerConfig::default())
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Gateway that keeps every message it is asked to send
#[derive(Default)]
struct RecordingGateway {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl SmsGateway for RecordingGateway {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, phone: &str, message: &str) -> finsmart_core::Result<String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((phone.to_string(), message.to_string()));
        Ok(format!("msg-{}", sent.len()))
    }
}

// ========== Calculator API Tests ==========

#[tokio::test]
async fn test_lumpsum_calculator() {
    let (store, state) = setup_state();
    let app = create_router(state, ServerConfig::default());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/calculators/lumpsum",
            serde_json::json!({ "principal": 100000.0, "annual_rate": 0.10, "years": 10 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["calculator"], "lumpsum");
    let future_value = json["summary"]["future_value"].as_f64().unwrap();
    assert!((future_value - 259_374.246).abs() < 0.01);
    assert_eq!(json["schedule"].as_array().unwrap().len(), 11);

    let activities = store.activities().unwrap();
    assert_eq!(
        activities[0].kind,
        ActivityKind::CalculatorUsed {
            calculator: CalculatorKind::Lumpsum
        }
    );
}

#[tokio::test]
async fn test_sip_calculator() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/calculators/sip",
            serde_json::json!({ "monthly_contribution": 1000.0, "annual_rate": 0.12, "years": 1 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["calculator"], "sip");
    assert_eq!(json["summary"]["invested"].as_f64().unwrap(), 12_000.0);
    // 1000 * ((1.01^12 - 1) / 0.01)
    let future_value = json["summary"]["future_value"].as_f64().unwrap();
    assert!((future_value - 12_682.503).abs() < 0.01);
}

#[tokio::test]
async fn test_step_up_calculator() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/calculators/step-up",
            serde_json::json!({
                "monthly_contribution": 1000.0,
                "annual_rate": 0.12,
                "years": 2,
                "step_up_rate": 0.10
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["calculator"], "step_up");
    // 12 * 1000 + 12 * 1100
    assert!((json["summary"]["invested"].as_f64().unwrap() - 25_200.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_goal_calculator() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/calculators/goal",
            serde_json::json!({ "target": 1000000.0, "annual_rate": 0.12, "years": 10 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["months"], 120);
    let monthly = json["monthly_contribution"].as_f64().unwrap();
    assert!(monthly > 4300.0 && monthly < 4400.0);
}

#[tokio::test]
async fn test_lumpsum_calculator_with_inflation() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/calculators/lumpsum",
            serde_json::json!({
                "principal": 100000.0,
                "annual_rate": 0.10,
                "years": 10,
                "inflation_rate": 0.06
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let summary = &json["summary"];
    assert!((summary["future_value"].as_f64().unwrap() - 259_374.246).abs() < 0.01);
    // 100000 * (1.10 / 1.06)^10
    assert!((summary["real_value"].as_f64().unwrap() - 144_833.224).abs() < 0.01);
    assert!((summary["real_rate"].as_f64().unwrap() - 0.037_735_849).abs() < 1e-6);

    let schedule = json["schedule"].as_array().unwrap();
    assert_eq!(schedule[0]["real_value"], 100000.0);
    let year_10 = schedule[10]["real_value"].as_f64().unwrap();
    assert!((year_10 - 144_833.224).abs() < 0.01);
}

#[tokio::test]
async fn test_goal_calculator_with_inflation() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/calculators/goal",
            serde_json::json!({
                "target": 1000000.0,
                "annual_rate": 0.12,
                "years": 10,
                "inflation_rate": 0.06
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["target"], 1000000.0);
    let adjusted = json["inflation_adjusted_target"].as_f64().unwrap();
    assert!((adjusted - 1_790_847.697).abs() < 0.01);
    let monthly = json["monthly_contribution"].as_f64().unwrap();
    assert!((monthly - 7_784.985).abs() < 0.01);
}

#[tokio::test]
async fn test_step_up_requires_contribution() {
    let (store, state) = setup_state();
    let app = create_router(state, ServerConfig::default());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/calculators/step-up",
            serde_json::json!({
                "monthly_contribution": 0.0,
                "annual_rate": 0.12,
                "years": 5,
                "step_up_rate": 0.10
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.activities().unwrap().is_empty());
}

#[tokio::test]
async fn test_retirement_calculator() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/calculators/retirement",
            serde_json::json!({
                "monthly_expenses": 50000.0,
                "current_age": 30,
                "retirement_age": 60,
                "life_expectancy": 85,
                "inflation_rate": 0.06
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["years_in_retirement"], 25);
    let annual = json["annual_expenses_at_retirement"].as_f64().unwrap();
    let corpus = json["corpus"].as_f64().unwrap();
    assert!((corpus - annual * 25.0).abs() < 1e-3);
}

#[tokio::test]
async fn test_calculator_invalid_input() {
    let (store, state) = setup_state();
    let app = create_router(state, ServerConfig::default());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/calculators/lumpsum",
            serde_json::json!({ "principal": -5.0, "annual_rate": 0.10, "years": 10 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("principal"));
    assert!(store.activities().unwrap().is_empty());
}

#[tokio::test]
async fn test_sip_requires_contribution() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/calculators/sip",
            serde_json::json!({ "monthly_contribution": 0.0, "annual_rate": 0.12, "years": 5 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Expense API Tests ==========

#[tokio::test]
async fn test_create_and_list_expenses() {
    let app = setup_test_app();

    for (date, category, amount) in [
        ("2024-06-03", "Food", 250.0),
        ("2024-06-10", "Transportation", 90.0),
        ("2024-07-01", "Food", 120.0),
    ] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/expenses",
                serde_json::json!({ "date": date, "category": category, "amount": amount }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(get_request("/api/expenses?month=2024-06"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let response = app
        .oneshot(get_request("/api/expenses?category=food"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    let expenses = json.as_array().unwrap();
    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[1]["amount"], 120.0);
}

#[tokio::test]
async fn test_create_expense_invalid_amount() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            serde_json::json!({ "date": "2024-06-03", "category": "Food", "amount": 0.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_expenses_invalid_month() {
    let app = setup_test_app();

    let response = app
        .oneshot(get_request("/api/expenses?month=June"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Budget API Tests ==========

#[tokio::test]
async fn test_list_budgets_falls_back_to_defaults() {
    let app = setup_test_app();

    let response = app.oneshot(get_request("/api/budgets")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let budgets = json.as_array().unwrap();
    assert_eq!(budgets.len(), 5);
    assert_eq!(budgets[0]["name"], "Food");
}

#[tokio::test]
async fn test_set_and_remove_budget() {
    let (store, state) = setup_state();
    let app = create_router(state, ServerConfig::default());

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/budgets",
            serde_json::json!({ "name": "Fuel", "limit": 500.0, "period": "weekly" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.budgets().unwrap()[0].period, BudgetPeriod::Weekly);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/budgets/fuel")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(store.budgets().unwrap().is_empty());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/budgets/Fuel")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_budget_negative_limit() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/budgets",
            serde_json::json!({ "name": "Food", "limit": -1.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_budget_status() {
    let (store, state) = setup_state();
    store
        .set_budget(BudgetCategory::new("Food", 1000.0, BudgetPeriod::Monthly).unwrap())
        .unwrap();
    store
        .set_budget(BudgetCategory::new("Rent", 500.0, BudgetPeriod::Monthly).unwrap())
        .unwrap();
    let date = chrono::NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
    store
        .add_expense(NewExpense::new(date, "Rent", 600.0, ""))
        .unwrap();
    store
        .add_expense(NewExpense::new(date, "Gifts", 40.0, ""))
        .unwrap();
    let app = create_router(state, ServerConfig::default());

    let response = app
        .oneshot(get_request("/api/budgets/status?date=2024-06-15"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["as_of"], "2024-06-15");
    assert_eq!(json["summary"]["over_budget_count"], 1);
    assert_eq!(json["unbudgeted"]["Gifts"], 40.0);

    let rent = &json["categories"][1];
    assert_eq!(rent["category"], "Rent");
    assert_eq!(rent["remaining"], -100.0);
    assert_eq!(rent["overspent"], 100.0);
    assert_eq!(rent["health"], "alert");

    let under: Vec<Activity> = store
        .activities()
        .unwrap()
        .into_iter()
        .filter(|a| matches!(a.kind, ActivityKind::StayedUnderBudget { .. }))
        .collect();
    assert_eq!(under.len(), 1);
}

#[tokio::test]
async fn test_budget_status_matches_categories_ignoring_case() {
    let (store, state) = setup_state();
    store
        .set_budget(BudgetCategory::new("Food", 1000.0, BudgetPeriod::Monthly).unwrap())
        .unwrap();
    store
        .set_budget(BudgetCategory::new("Fuel", 500.0, BudgetPeriod::Weekly).unwrap())
        .unwrap();
    store
        .add_expense(NewExpense::new(
            chrono::NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            "food",
            300.0,
            "",
        ))
        .unwrap();
    store
        .add_expense(NewExpense::new(
            chrono::NaiveDate::from_ymd_opt(2024, 4, 8).unwrap(),
            "Fuel",
            450.0,
            "",
        ))
        .unwrap();
    let app = create_router(state, ServerConfig::default());

    let response = app
        .oneshot(get_request("/api/budgets/status?date=2024-04-09"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["categories"][0]["category"], "Food");
    assert_eq!(json["categories"][0]["spent"], 300.0);
    assert!(json["unbudgeted"].as_object().unwrap().is_empty());

    // The weekly Fuel budget stays out of the monthly pace
    assert_eq!(json["pace"]["spent_percent"], 30.0);
    assert_eq!(json["pace"]["status"], "on_track");
}

#[tokio::test]
async fn test_allocate_budget() {
    let (store, state) = setup_state();
    let app = create_router(state, ServerConfig::default());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/budgets/allocate",
            serde_json::json!({
                "total": 10000.0,
                "weights": [
                    { "category": "Food", "weight": 3.0 },
                    { "category": "Rent", "weight": 5.0 },
                    { "category": "Fun", "weight": 2.0 }
                ],
                "save": true
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let allocations = json.as_array().unwrap();
    assert_eq!(allocations.len(), 3);
    assert_eq!(allocations[1]["category"], "Rent");
    assert!((allocations[1]["limit"].as_f64().unwrap() - 5000.0).abs() < 1e-9);
    assert_eq!(store.budgets().unwrap().len(), 3);
}

#[tokio::test]
async fn test_allocate_budget_rejects_zero_weights() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/budgets/allocate",
            serde_json::json!({
                "total": 1000.0,
                "weights": [{ "category": "Food", "weight": 0.0 }]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Planner API Tests ==========

#[tokio::test]
async fn test_plan_week_equal() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/planner/weekly",
            serde_json::json!({ "weekly_total": 7000.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let days = json["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["day"], "Mon");
    assert_eq!(days[0]["amount"], 1000.0);
    assert_eq!(json["insights"]["average_daily"], 1000.0);
}

#[tokio::test]
async fn test_plan_week_custom_mismatch() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/planner/weekly",
            serde_json::json!({
                "weekly_total": 7000.0,
                "strategy": { "type": "custom", "values": [1000, 1000, 1000, 1000, 1000, 1000, 999] }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Alert API Tests ==========

#[tokio::test]
async fn test_list_alerts() {
    let (store, state) = setup_state();
    store
        .set_budget(BudgetCategory::new("Food", 100.0, BudgetPeriod::Monthly).unwrap())
        .unwrap();
    store
        .set_budget(BudgetCategory::new("Rent", 100.0, BudgetPeriod::Monthly).unwrap())
        .unwrap();
    store
        .add_expense(NewExpense::new(today(), "Food", 85.0, ""))
        .unwrap();
    store
        .add_expense(NewExpense::new(today(), "Rent", 50.0, ""))
        .unwrap();
    let app = create_router(state, ServerConfig::default());

    let response = app.clone().oneshot(get_request("/api/alerts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let alerts = json.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["category"], "Food");
    assert_eq!(alerts[0]["level"], "warning");

    let response = app
        .clone()
        .oneshot(get_request("/api/alerts?threshold=0.5"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let response = app
        .oneshot(get_request("/api/alerts?threshold=1.5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_alerts_once_per_month() {
    let store = Arc::new(MemoryStore::new());
    let gateway = Arc::new(RecordingGateway::default());
    let mut settings = Settings::builtin().unwrap();
    settings.alerts.enabled = true;
    settings.alerts.phone_number = Some("98765 43210".to_string());

    store
        .set_budget(BudgetCategory::new("Food", 100.0, BudgetPeriod::Monthly).unwrap())
        .unwrap();
    store
        .add_expense(NewExpense::new(today(), "Food", 120.0, ""))
        .unwrap();

    let state = AppState::new(store.clone(), settings).with_gateway(gateway.clone());
    let app = create_router(state, ServerConfig::default());

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/alerts/send", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["sent"], serde_json::json!(["Food"]));

    let response = app
        .oneshot(json_request("POST", "/api/alerts/send", serde_json::json!({})))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["skipped"], serde_json::json!(["Food"]));

    let sent = gateway.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "+919876543210");
    assert!(sent[0].1.contains("CRITICAL"));
}

#[tokio::test]
async fn test_send_alerts_disabled() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request("POST", "/api/alerts/send", serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Gamification API Tests ==========

#[tokio::test]
async fn test_record_activity_and_profile() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/activities",
            serde_json::json!({ "date": "2024-06-01", "type": "login" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/activities",
            serde_json::json!({ "date": "2024-06-01", "type": "budget_set", "category": "Food" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get_request("/api/gamification")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["current_streak"], 1);
    assert_eq!(json["last_login"], "2024-06-01");
    assert!(json["points"].as_u64().unwrap() >= 10);
    assert_eq!(json["challenges"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_record_activity_rejects_unknown_type() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/activities",
            serde_json::json!({ "date": "2024-06-01", "type": "teleported" }),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// ========== Security Tests ==========

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();

    let response = app.oneshot(get_request("/api/budgets")).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
}
