use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{JobCategory, ProviderCard};
use crate::services::catalog;
use crate::state::AppState;

// GET /api/providers
#[derive(Deserialize)]
pub struct ProvidersQuery {
    pub q: Option<String>,
    pub job: Option<String>,
}

pub async fn list_providers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProvidersQuery>,
) -> Result<Json<Vec<ProviderCard>>, AppError> {
    let job = match query.job.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(j) => Some(
            JobCategory::parse(j)
                .ok_or_else(|| AppError::BadRequest(format!("unknown job category: {j}")))?,
        ),
    };

    let db = state.lock_db()?;
    let providers = catalog::search_providers(&db, query.q.as_deref().unwrap_or(""), job)?;
    Ok(Json(providers))
}

// GET /api/providers/:id
pub async fn get_provider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProviderCard>, AppError> {
    let db = state.lock_db()?;
    Ok(Json(catalog::provider_detail(&db, &id)?))
}
