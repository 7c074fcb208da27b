use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, BodyDataStream};
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tokio_stream::StreamExt;
use tower::ServiceExt;

use conciergepro::config::AppConfig;
use conciergepro::db;
use conciergepro::handlers;
use conciergepro::services::payment::wave::WaveSimulator;
use conciergepro::services::payment::PaymentGateway;
use conciergepro::state::AppState;

// ── Mock Gateway ──

/// Opens checkouts but never confirms them.
struct DecliningGateway;

#[async_trait]
impl PaymentGateway for DecliningGateway {
    async fn create_checkout(&self, _amount: i64, _request_id: &str) -> anyhow::Result<String> {
        Ok("WAVE-DECLINED1".to_string())
    }

    async fn confirm(&self, _reference: &str) -> anyhow::Result<bool> {
        Ok(false)
    }
}

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        admin_email: "admin@conciergepro.com".to_string(),
        payment_amount: 15000,
        checkout_delay_ms: 0,
        confirm_delay_ms: 0,
    }
}

fn test_state() -> Arc<AppState> {
    test_state_with(Box::new(WaveSimulator::new(Duration::ZERO, Duration::ZERO)))
}

fn test_state_with(payments: Box<dyn PaymentGateway>) -> Arc<AppState> {
    let conn = db::init_db(":memory:").unwrap();
    Arc::new(AppState::new(conn, test_config(), payments))
}

fn test_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route(
            "/api/me",
            get(handlers::auth::me).patch(handlers::auth::update_me),
        )
        .route("/api/providers", get(handlers::providers::list_providers))
        .route("/api/providers/:id", get(handlers::providers::get_provider))
        .route("/api/requests", post(handlers::requests::create_request))
        .route(
            "/api/requests/:id/accept",
            post(handlers::requests::accept_request),
        )
        .route(
            "/api/requests/:id/reject",
            post(handlers::requests::reject_request),
        )
        .route(
            "/api/requests/:id/complete",
            post(handlers::requests::complete_request),
        )
        .route("/api/requests/:id/pay", post(handlers::requests::pay_request))
        .route(
            "/api/client/dashboard",
            get(handlers::requests::client_dashboard),
        )
        .route(
            "/api/provider/dashboard",
            get(handlers::requests::provider_dashboard),
        )
        .route("/api/admin/stats", get(handlers::admin::get_stats))
        .route("/api/admin/users", get(handlers::admin::get_users))
        .route("/api/admin/providers", get(handlers::admin::get_providers))
        .route(
            "/api/admin/providers/:id/verify",
            post(handlers::admin::verify_provider),
        )
        .route(
            "/api/admin/transactions",
            get(handlers::admin::get_transactions),
        )
        .route(
            "/api/notifications",
            get(handlers::notifications::get_notifications),
        )
        .route(
            "/api/notifications/read",
            post(handlers::notifications::mark_read),
        )
        .route("/api/events", get(handlers::events::events_stream))
        .with_state(state)
}

async fn call(
    state: &Arc<AppState>,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = test_app(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Registers an account and returns (token, user id).
async fn register(state: &Arc<AppState>, body: Value) -> (String, String) {
    let (status, json) = call(state, "POST", "/api/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::OK, "register failed: {json}");
    (
        json["token"].as_str().unwrap().to_string(),
        json["user"]["id"].as_str().unwrap().to_string(),
    )
}

async fn register_client(state: &Arc<AppState>, name: &str, email: &str) -> (String, String) {
    register(
        state,
        json!({
            "role": "client",
            "name": name,
            "email": email,
            "password": "secret",
            "phone": "+221770000001",
            "address": "Médina, Dakar",
        }),
    )
    .await
}

async fn register_provider(
    state: &Arc<AppState>,
    email: &str,
    business_name: &str,
    job: &str,
) -> (String, String) {
    register(
        state,
        json!({
            "role": "provider",
            "name": "Moussa Diop",
            "email": email,
            "password": "secret",
            "phone": "+221770000002",
            "address": "Plateau, Dakar",
            "business_name": business_name,
            "job": job,
            "description": "Dépannage rapide",
        }),
    )
    .await
}

async fn admin_token(state: &Arc<AppState>) -> String {
    let (status, json) = call(
        state,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "admin@conciergepro.com", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json["token"].as_str().unwrap().to_string()
}

async fn book(state: &Arc<AppState>, token: &str, provider_id: &str) -> Value {
    book_for(state, token, provider_id, "Fuite d'eau").await
}

async fn book_for(
    state: &Arc<AppState>,
    token: &str,
    provider_id: &str,
    description: &str,
) -> Value {
    let (status, json) = call(
        state,
        "POST",
        "/api/requests",
        Some(token),
        Some(json!({
            "provider_id": provider_id,
            "description": description,
            "scheduled_at": "2030-01-15",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "booking failed: {json}");
    json
}

async fn open_events(state: &Arc<AppState>, query: &str) -> (StatusCode, BodyDataStream) {
    let req = Request::builder()
        .uri(format!("/api/events?{query}"))
        .body(Body::empty())
        .unwrap();
    let res = test_app(state.clone()).oneshot(req).await.unwrap();
    (res.status(), res.into_body().into_data_stream())
}

/// Reads the event stream until `needle` shows up and returns everything read.
async fn read_events_until(stream: &mut BodyDataStream, needle: &str) -> String {
    let mut seen = String::new();
    while !seen.contains(needle) {
        let chunk = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("timed out waiting for event")
            .expect("event stream ended")
            .unwrap();
        seen.push_str(&String::from_utf8_lossy(&chunk));
    }
    seen
}

// ── Health & Session ──

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let (status, json) = call(&state, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_register_login_me_logout() {
    let state = test_state();
    let (token, user_id) = register_client(&state, "Aissatou", "aissatou@example.com").await;

    let (status, json) = call(&state, "GET", "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user"]["id"], user_id.as_str());
    assert_eq!(json["user"]["role"], "client");
    assert_eq!(json["navigation"], json!(["home", "client-dashboard"]));

    let (status, json) = call(
        &state,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "aissatou@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["landing_view"], "home");

    let (status, _) = call(&state, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&state, "GET", "/api/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_unknown_email() {
    let state = test_state();
    let (status, json) = call(
        &state,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "nobody@example.com", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthorized");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let state = test_state();
    register_client(&state, "Aissatou", "aissatou@example.com").await;
    let (status, _) = call(
        &state,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "role": "client",
            "name": "Other",
            "email": "aissatou@example.com",
            "phone": "1",
            "address": "Dakar",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_provider_profile_patch() {
    let state = test_state();
    let (token, provider_id) =
        register_provider(&state, "moussa@example.com", "Plombier Dakar", "plumber").await;

    let (status, json) = call(
        &state,
        "PATCH",
        "/api/me",
        Some(&token),
        Some(json!({"is_active": false, "description": "Fermé"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["provider"]["is_active"], false);
    assert_eq!(json["provider"]["is_verified"], false);

    let (status, _) = call(&state, "GET", &format!("/api/providers/{provider_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Browse ──

#[tokio::test]
async fn test_filter_by_job() {
    let state = test_state();
    let (_, plumber_id) =
        register_provider(&state, "moussa@example.com", "Plombier Dakar", "plumber").await;
    let (_, mechanic_id) =
        register_provider(&state, "fatou@example.com", "Garage Thiès", "mechanic").await;

    let (status, json) = call(&state, "GET", "/api/providers?job=plumber", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], plumber_id.as_str());
    assert_eq!(list[0]["info"]["business_name"], "Plombier Dakar");

    let (_, json) = call(&state, "GET", "/api/providers?q=garage", None, None).await;
    assert_eq!(json.as_array().unwrap()[0]["id"], mechanic_id.as_str());

    let (_, json) = call(&state, "GET", "/api/providers", None, None).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (status, _) = call(&state, "GET", "/api/providers?job=astronaut", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Booking & Lifecycle ──

#[tokio::test]
async fn test_booking_ignores_submitted_status() {
    let state = test_state();
    let (client_token, _) = register_client(&state, "Aissatou", "aissatou@example.com").await;
    let (_, provider_id) =
        register_provider(&state, "moussa@example.com", "Plombier Dakar", "plumber").await;

    let (status, json) = call(
        &state,
        "POST",
        "/api/requests",
        Some(&client_token),
        Some(json!({
            "provider_id": provider_id,
            "description": "Fuite d'eau",
            "scheduled_at": "2030-01-15",
            "status": "paid",
            "price": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "pending");
    assert_eq!(json["price"], Value::Null);
    assert_eq!(json["address"], "Médina, Dakar");
}

#[tokio::test]
async fn test_booking_requires_session() {
    let state = test_state();
    let (_, provider_id) =
        register_provider(&state, "moussa@example.com", "Plombier Dakar", "plumber").await;

    let (status, _) = call(
        &state,
        "POST",
        "/api/requests",
        None,
        Some(json!({
            "provider_id": provider_id,
            "description": "Fuite d'eau",
            "scheduled_at": "2030-01-15",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_only_named_provider_transitions() {
    let state = test_state();
    let (client_token, _) = register_client(&state, "Aissatou", "aissatou@example.com").await;
    let (_, provider_id) =
        register_provider(&state, "moussa@example.com", "Plombier Dakar", "plumber").await;
    let (other_token, _) =
        register_provider(&state, "other@example.com", "Autre Plombier", "plumber").await;

    let request = book(&state, &client_token, &provider_id).await;
    let id = request["id"].as_str().unwrap();

    let (status, _) = call(&state, "POST", &format!("/api/requests/{id}/accept"), Some(&client_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&state, "POST", &format!("/api/requests/{id}/accept"), Some(&other_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_pay_before_completion_conflicts() {
    let state = test_state();
    let (client_token, _) = register_client(&state, "Aissatou", "aissatou@example.com").await;
    let (provider_token, provider_id) =
        register_provider(&state, "moussa@example.com", "Plombier Dakar", "plumber").await;

    let request = book(&state, &client_token, &provider_id).await;
    let id = request["id"].as_str().unwrap();

    let (status, _) = call(&state, "POST", &format!("/api/requests/{id}/pay"), Some(&client_token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    call(&state, "POST", &format!("/api/requests/{id}/accept"), Some(&provider_token), None).await;
    let (status, _) = call(&state, "POST", &format!("/api/requests/{id}/pay"), Some(&client_token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let admin = admin_token(&state).await;
    let (_, txs) = call(&state, "GET", "/api/admin/transactions", Some(&admin), None).await;
    assert!(txs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_declined_payment_leaves_request_completed() {
    let state = test_state_with(Box::new(DecliningGateway));
    let (client_token, _) = register_client(&state, "Aissatou", "aissatou@example.com").await;
    let (provider_token, provider_id) =
        register_provider(&state, "moussa@example.com", "Plombier Dakar", "plumber").await;

    let request = book(&state, &client_token, &provider_id).await;
    let id = request["id"].as_str().unwrap();
    call(&state, "POST", &format!("/api/requests/{id}/accept"), Some(&provider_token), None).await;
    call(&state, "POST", &format!("/api/requests/{id}/complete"), Some(&provider_token), None).await;

    let (status, _) = call(&state, "POST", &format!("/api/requests/{id}/pay"), Some(&client_token), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, dashboard) = call(&state, "GET", "/api/client/dashboard", Some(&client_token), None).await;
    let entry = &dashboard.as_array().unwrap()[0];
    assert_eq!(entry["status"], "completed");
    assert_eq!(entry["price"], Value::Null);
    assert_eq!(entry["allowed_actions"], json!(["pay"]));
    assert_eq!(entry["transactions"][0]["status"], "failed");
}

// ── Admin ──

#[tokio::test]
async fn test_admin_requires_admin_role() {
    let state = test_state();
    let (status, _) = call(&state, "GET", "/api/admin/stats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (client_token, _) = register_client(&state, "Aissatou", "aissatou@example.com").await;
    let (status, _) = call(&state, "GET", "/api/admin/stats", Some(&client_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&state, "GET", "/api/admin/stats", Some("wrong-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_verify_is_idempotent() {
    let state = test_state();
    let admin = admin_token(&state).await;
    let (_, provider_id) =
        register_provider(&state, "moussa@example.com", "Plombier Dakar", "plumber").await;

    let (_, stats) = call(&state, "GET", "/api/admin/stats", Some(&admin), None).await;
    assert_eq!(stats["total_users"], 2);
    assert_eq!(stats["providers"], 1);
    assert_eq!(stats["verified"], 0);
    assert_eq!(stats["awaiting_verification"], 1);

    let uri = format!("/api/admin/providers/{provider_id}/verify");
    for _ in 0..2 {
        let (status, json) = call(&state, "POST", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["is_verified"], true);
    }

    let (_, providers) = call(&state, "GET", "/api/admin/providers", Some(&admin), None).await;
    let providers = providers.as_array().unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0]["info"]["is_verified"], true);

    let (_, stats) = call(&state, "GET", "/api/admin/stats", Some(&admin), None).await;
    assert_eq!(stats["verified"], 1);
    assert_eq!(stats["awaiting_verification"], 0);

    let (_, users) = call(&state, "GET", "/api/admin/users", Some(&admin), None).await;
    assert_eq!(users.as_array().unwrap().len(), 2);

    let (status, _) = call(&state, "POST", "/api/admin/providers/nobody/verify", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── End to End ──

#[tokio::test]
async fn test_full_booking_and_payment_flow() {
    let state = test_state();
    let (client_token, client_id) =
        register_client(&state, "Aissatou", "aissatou@example.com").await;
    let (provider_token, provider_id) =
        register_provider(&state, "plombier@example.com", "Plombier Dakar", "plumber").await;

    let request = book(&state, &client_token, &provider_id).await;
    let id = request["id"].as_str().unwrap().to_string();
    assert_eq!(request["status"], "pending");
    assert_eq!(request["client_id"], client_id.as_str());

    // Visible to both parties as pending
    let (_, client_view) = call(&state, "GET", "/api/client/dashboard", Some(&client_token), None).await;
    assert_eq!(client_view[0]["id"], id.as_str());
    assert_eq!(client_view[0]["status"], "pending");
    assert_eq!(client_view[0]["provider_name"], "Moussa Diop");

    let (_, provider_view) = call(&state, "GET", "/api/provider/dashboard", Some(&provider_token), None).await;
    assert_eq!(provider_view["requests"][0]["status"], "pending");
    assert_eq!(provider_view["requests"][0]["client_name"], "Aissatou");
    assert_eq!(provider_view["requests"][0]["allowed_actions"], json!(["accept", "reject"]));
    assert_eq!(provider_view["stats"]["pending"], 1);

    // Provider accepts
    let (status, json) = call(&state, "POST", &format!("/api/requests/{id}/accept"), Some(&provider_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "accepted");
    let (_, client_view) = call(&state, "GET", "/api/client/dashboard", Some(&client_token), None).await;
    assert_eq!(client_view[0]["status"], "accepted");

    // Provider completes, client now sees the pay action
    let (status, _) = call(&state, "POST", &format!("/api/requests/{id}/complete"), Some(&provider_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, client_view) = call(&state, "GET", "/api/client/dashboard", Some(&client_token), None).await;
    assert_eq!(client_view[0]["status"], "completed");
    assert_eq!(client_view[0]["allowed_actions"], json!(["pay"]));

    // Client pays
    let (status, receipt) = call(&state, "POST", &format!("/api/requests/{id}/pay"), Some(&client_token), None).await;
    assert_eq!(status, StatusCode::OK, "pay failed: {receipt}");
    assert_eq!(receipt["transaction_status"], "success");
    assert_eq!(receipt["request_status"], "paid");
    assert_eq!(receipt["amount"], 15000);
    assert!(receipt["reference"].as_str().unwrap().starts_with("WAVE-"));

    let (_, client_view) = call(&state, "GET", "/api/client/dashboard", Some(&client_token), None).await;
    assert_eq!(client_view[0]["status"], "paid");
    assert_eq!(client_view[0]["price"], 15000);
    assert_eq!(client_view[0]["transactions"][0]["status"], "success");
    assert!(client_view[0]["allowed_actions"].as_array().unwrap().is_empty());

    let (_, provider_view) = call(&state, "GET", "/api/provider/dashboard", Some(&provider_token), None).await;
    assert_eq!(provider_view["stats"]["revenue"], 15000);

    // Paying twice is refused
    let (status, _) = call(&state, "POST", &format!("/api/requests/{id}/pay"), Some(&client_token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let admin = admin_token(&state).await;
    let (_, txs) = call(&state, "GET", "/api/admin/transactions", Some(&admin), None).await;
    let txs = txs.as_array().unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0]["status"], "success");
    assert_eq!(txs[0]["request_id"], id.as_str());

    // Provider heard about the booking and the payment; client about accept and complete
    let (_, notes) = call(&state, "GET", "/api/notifications", Some(&provider_token), None).await;
    assert_eq!(notes.as_array().unwrap().len(), 2);
    let (_, notes) = call(&state, "GET", "/api/notifications", Some(&client_token), None).await;
    assert_eq!(notes.as_array().unwrap().len(), 2);

    let (_, json) = call(&state, "POST", "/api/notifications/read", Some(&client_token), None).await;
    assert_eq!(json["updated"], 2);
}

// ── Live Events ──

#[tokio::test]
async fn test_events_require_session() {
    let state = test_state();
    let (status, _) = open_events(&state, "token=not-a-session").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = open_events(&state, "").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_events_catch_up_then_live_for_own_user_only() {
    let state = test_state();
    let (client_token, _) = register_client(&state, "Aissatou", "aissatou@example.com").await;
    let (plumber_token, plumber_id) =
        register_provider(&state, "moussa@example.com", "Plombier Dakar", "plumber").await;
    let (_, mechanic_id) =
        register_provider(&state, "fatou@example.com", "Garage Thies", "mechanic").await;

    book_for(&state, &client_token, &plumber_id, "Fuite d'eau").await;
    book_for(&state, &client_token, &mechanic_id, "Panne moteur").await;

    let (status, mut events) = open_events(&state, &format!("token={plumber_token}")).await;
    assert_eq!(status, StatusCode::OK);

    let caught_up = read_events_until(&mut events, "Fuite d'eau").await;
    assert!(caught_up.contains("event: notification"));
    assert!(!caught_up.contains("Panne moteur"));

    // The mechanic's booking is broadcast first and must be filtered out
    book_for(&state, &client_token, &mechanic_id, "Pneu crevé").await;
    book_for(&state, &client_token, &plumber_id, "Robinet cassé").await;

    let live = read_events_until(&mut events, "Robinet cass").await;
    assert!(!live.contains("Pneu crev"));
    assert!(!live.contains("Fuite d'eau"));
}

#[tokio::test]
async fn test_events_resume_after_last_id() {
    let state = test_state();
    let (client_token, _) = register_client(&state, "Aissatou", "aissatou@example.com").await;
    let (plumber_token, plumber_id) =
        register_provider(&state, "moussa@example.com", "Plombier Dakar", "plumber").await;

    book_for(&state, &client_token, &plumber_id, "Fuite d'eau").await;
    book_for(&state, &client_token, &plumber_id, "Robinet cassé").await;

    let (_, notes) = call(&state, "GET", "/api/notifications", Some(&plumber_token), None).await;
    let notes = notes.as_array().unwrap();
    assert_eq!(notes.len(), 2);
    // Newest first, so the older one is last
    let first_id = notes[1]["id"].as_i64().unwrap();

    let (status, mut events) = open_events(
        &state,
        &format!("token={plumber_token}&last_id={first_id}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let seen = read_events_until(&mut events, "Robinet cass").await;
    assert!(!seen.contains("Fuite d'eau"));
}
