use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{ProviderCard, ProviderInfos, Transaction, User, UserRole};
use crate::services::dashboard::{self, AdminStats};
use crate::state::AppState;

use super::require_role;

// GET /api/admin/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AdminStats>, AppError> {
    require_role(&state, &headers, UserRole::Admin)?;
    let db = state.lock_db()?;
    Ok(Json(dashboard::admin_stats(&db)?))
}

// GET /api/admin/users
pub async fn get_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<User>>, AppError> {
    require_role(&state, &headers, UserRole::Admin)?;
    let db = state.lock_db()?;
    Ok(Json(queries::list_users(&db)?))
}

// GET /api/admin/providers
pub async fn get_providers(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ProviderCard>>, AppError> {
    require_role(&state, &headers, UserRole::Admin)?;
    let db = state.lock_db()?;
    Ok(Json(dashboard::admin_providers(&db)?))
}

// POST /api/admin/providers/:id/verify
pub async fn verify_provider(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ProviderInfos>, AppError> {
    require_role(&state, &headers, UserRole::Admin)?;
    let db = state.lock_db()?;
    Ok(Json(dashboard::verify_provider(&db, &id)?))
}

// GET /api/admin/transactions
#[derive(Deserialize)]
pub struct TransactionsQuery {
    pub limit: Option<i64>,
}

pub async fn get_transactions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    require_role(&state, &headers, UserRole::Admin)?;
    let limit = query.limit.unwrap_or(100);
    let db = state.lock_db()?;
    Ok(Json(queries::list_transactions(&db, limit)?))
}
