use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Notification;
use crate::state::AppState;

use super::require_user;

// GET /api/notifications
#[derive(Deserialize)]
pub struct NotificationsQuery {
    pub limit: Option<i64>,
}

pub async fn get_notifications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let user = require_user(&state, &headers)?;
    let limit = query.limit.unwrap_or(50);
    let db = state.lock_db()?;
    Ok(Json(queries::list_notifications(&db, &user.id, limit)?))
}

// POST /api/notifications/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = require_user(&state, &headers)?;
    let db = state.lock_db()?;
    let updated = queries::mark_notifications_read(&db, &user.id)?;
    Ok(Json(serde_json::json!({"ok": true, "updated": updated})))
}
