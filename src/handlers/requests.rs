use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::errors::AppError;
use crate::models::{ServiceRequest, UserRole};
use crate::services::booking::{self, BookingForm};
use crate::services::dashboard::{self, ClientRequestView, ProviderDashboard};
use crate::services::lifecycle::RequestAction;
use crate::services::payment::{self, PaymentReceipt};
use crate::state::AppState;

use super::{require_role, require_user};

// POST /api/requests
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<BookingForm>,
) -> Result<(StatusCode, Json<ServiceRequest>), AppError> {
    let client = require_user(&state, &headers)?;
    let db = state.lock_db()?;
    let request = booking::create_request(&state, &db, &client, body)?;
    Ok((StatusCode::CREATED, Json(request)))
}

// GET /api/client/dashboard
pub async fn client_dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ClientRequestView>>, AppError> {
    let client = require_role(&state, &headers, UserRole::Client)?;
    let db = state.lock_db()?;
    Ok(Json(dashboard::client_requests(&db, &client)?))
}

// GET /api/provider/dashboard
pub async fn provider_dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ProviderDashboard>, AppError> {
    let provider = require_role(&state, &headers, UserRole::Provider)?;
    let db = state.lock_db()?;
    Ok(Json(dashboard::provider_dashboard(&db, &provider)?))
}

fn apply(
    state: &AppState,
    headers: &HeaderMap,
    id: &str,
    action: RequestAction,
) -> Result<Json<ServiceRequest>, AppError> {
    let actor = require_user(state, headers)?;
    let db = state.lock_db()?;
    Ok(Json(booking::transition(state, &db, &actor, id, action)?))
}

// POST /api/requests/:id/accept
pub async fn accept_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ServiceRequest>, AppError> {
    apply(&state, &headers, &id, RequestAction::Accept)
}

// POST /api/requests/:id/reject
pub async fn reject_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ServiceRequest>, AppError> {
    apply(&state, &headers, &id, RequestAction::Reject)
}

// POST /api/requests/:id/complete
pub async fn complete_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ServiceRequest>, AppError> {
    apply(&state, &headers, &id, RequestAction::Complete)
}

// POST /api/requests/:id/pay
pub async fn pay_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PaymentReceipt>, AppError> {
    let client = require_user(&state, &headers)?;
    let receipt = payment::pay_request(&state, &client, &id).await?;
    Ok(Json(receipt))
}
