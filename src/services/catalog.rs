use std::collections::HashMap;

use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{JobCategory, ProviderCard, UserRole};

/// Active providers whose name or business name contains `search`
/// (case-insensitive) and whose job matches `job` when given.
pub fn search_providers(
    conn: &Connection,
    search: &str,
    job: Option<JobCategory>,
) -> anyhow::Result<Vec<ProviderCard>> {
    let mut users: HashMap<String, _> = queries::list_users(conn)?
        .into_iter()
        .filter(|u| u.role == UserRole::Provider)
        .map(|u| (u.id.clone(), u))
        .collect();

    let needle = search.trim().to_lowercase();

    let cards = queries::list_provider_infos(conn)?
        .into_iter()
        .filter(|info| info.is_active)
        .filter_map(|info| {
            users
                .remove(&info.user_id)
                .map(|user| ProviderCard { user, info })
        })
        .filter(|card| matches(card, &needle, job))
        .collect();

    Ok(cards)
}

fn matches(card: &ProviderCard, needle: &str, job: Option<JobCategory>) -> bool {
    let text_match = needle.is_empty()
        || card.user.name.to_lowercase().contains(needle)
        || card.info.business_name.to_lowercase().contains(needle);
    let job_match = job.map_or(true, |j| card.info.job == j);
    text_match && job_match
}

pub fn provider_detail(conn: &Connection, user_id: &str) -> Result<ProviderCard, AppError> {
    let not_found = || AppError::NotFound(format!("provider {user_id}"));

    let info = queries::get_provider_infos(conn, user_id)?
        .filter(|info| info.is_active)
        .ok_or_else(not_found)?;
    let user = queries::get_user(conn, user_id)?
        .filter(|u| u.role == UserRole::Provider)
        .ok_or_else(not_found)?;

    Ok(ProviderCard { user, info })
}
