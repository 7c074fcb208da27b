pub mod admin;
pub mod auth;
pub mod events;
pub mod health;
pub mod notifications;
pub mod providers;
pub mod requests;

use axum::http::HeaderMap;

use crate::errors::AppError;
use crate::models::{User, UserRole};
use crate::services::accounts;
use crate::state::AppState;

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the session user behind the request's bearer token.
pub(crate) fn require_user(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
    let db = state.lock_db()?;
    accounts::current_user(&db, token)
}

pub(crate) fn require_role(
    state: &AppState,
    headers: &HeaderMap,
    role: UserRole,
) -> Result<User, AppError> {
    let user = require_user(state, headers)?;
    if user.role != role {
        tracing::warn!(user_id = %user.id, required = role.as_str(), "role check failed");
        return Err(AppError::Forbidden(format!("{} access required", role.as_str())));
    }
    Ok(user)
}
