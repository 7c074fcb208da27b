use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::services::accounts::{self, Profile, ProfilePatch, Registration, Session};
use crate::state::AppState;

use super::{bearer_token, require_user};

// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Registration>,
) -> Result<Json<Session>, AppError> {
    let mut db = state.lock_db()?;
    let session = accounts::register(&mut db, body)?;
    Ok(Json(session))
}

// POST /api/auth/login
// Credentials are not checked; a password in the body is ignored.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    let db = state.lock_db()?;
    let session = accounts::login(&db, &body.email)?;
    Ok(Json(session))
}

// POST /api/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let db = state.lock_db()?;
    accounts::logout(&db, token)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

// GET /api/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Profile>, AppError> {
    let user = require_user(&state, &headers)?;
    let db = state.lock_db()?;
    Ok(Json(accounts::profile(&db, user)?))
}

// PATCH /api/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ProfilePatch>,
) -> Result<Json<Profile>, AppError> {
    let user = require_user(&state, &headers)?;
    let mut db = state.lock_db()?;
    Ok(Json(accounts::update_profile(&mut db, user, body)?))
}
