use std::collections::HashMap;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    ProviderCard, ProviderInfos, RequestStatus, ServiceRequest, Transaction, User, UserRole,
};
use crate::services::lifecycle::{allowed_actions, RequestAction};

const UNKNOWN_NAME: &str = "Inconnu";

#[derive(Debug, Clone, Serialize)]
pub struct ClientRequestView {
    #[serde(flatten)]
    pub request: ServiceRequest,
    pub provider_name: String,
    pub allowed_actions: Vec<RequestAction>,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderRequestView {
    #[serde(flatten)]
    pub request: ServiceRequest,
    pub client_name: String,
    pub allowed_actions: Vec<RequestAction>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ProviderStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    /// Sum of prices over paid requests, in FCFA.
    pub revenue: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderDashboard {
    pub info: Option<ProviderInfos>,
    pub stats: ProviderStats,
    pub requests: Vec<ProviderRequestView>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AdminStats {
    pub total_users: i64,
    pub providers: i64,
    pub verified: i64,
    pub awaiting_verification: i64,
}

fn user_names(conn: &Connection) -> anyhow::Result<HashMap<String, String>> {
    Ok(queries::list_users(conn)?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect())
}

fn name_of(names: &HashMap<String, String>, id: &str) -> String {
    names
        .get(id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

pub fn client_requests(conn: &Connection, client: &User) -> anyhow::Result<Vec<ClientRequestView>> {
    let names = user_names(conn)?;
    queries::list_requests_for_client(conn, &client.id)?
        .into_iter()
        .map(|request| -> anyhow::Result<ClientRequestView> {
            Ok(ClientRequestView {
                provider_name: name_of(&names, &request.provider_id),
                allowed_actions: allowed_actions(&request, client),
                transactions: queries::list_transactions_for_request(conn, &request.id)?,
                request,
            })
        })
        .collect()
}

pub fn provider_stats(requests: &[ServiceRequest]) -> ProviderStats {
    let count = |status: RequestStatus| requests.iter().filter(|r| r.status == status).count();
    ProviderStats {
        total: requests.len(),
        pending: count(RequestStatus::Pending),
        completed: count(RequestStatus::Completed),
        revenue: requests
            .iter()
            .filter(|r| r.status == RequestStatus::Paid)
            .map(|r| r.price.unwrap_or(0))
            .sum(),
    }
}

pub fn provider_dashboard(conn: &Connection, provider: &User) -> anyhow::Result<ProviderDashboard> {
    let names = user_names(conn)?;
    let requests = queries::list_requests_for_provider(conn, &provider.id)?;
    let stats = provider_stats(&requests);

    let requests = requests
        .into_iter()
        .map(|request| ProviderRequestView {
            client_name: name_of(&names, &request.client_id),
            allowed_actions: allowed_actions(&request, provider),
            request,
        })
        .collect();

    Ok(ProviderDashboard {
        info: queries::get_provider_infos(conn, &provider.id)?,
        stats,
        requests,
    })
}

pub fn admin_stats(conn: &Connection) -> anyhow::Result<AdminStats> {
    Ok(AdminStats {
        total_users: queries::count_users(conn, None)?,
        providers: queries::count_users(conn, Some(UserRole::Provider))?,
        verified: queries::count_providers_by_verification(conn, true)?,
        awaiting_verification: queries::count_providers_by_verification(conn, false)?,
    })
}

/// Every provider profile with its account, active or not.
pub fn admin_providers(conn: &Connection) -> anyhow::Result<Vec<ProviderCard>> {
    let mut users: HashMap<String, User> = queries::list_users(conn)?
        .into_iter()
        .map(|u| (u.id.clone(), u))
        .collect();

    Ok(queries::list_provider_infos(conn)?
        .into_iter()
        .filter_map(|info| {
            users
                .remove(&info.user_id)
                .map(|user| ProviderCard { user, info })
        })
        .collect())
}

/// Marks a provider as verified. Verifying an already verified provider is a no-op.
pub fn verify_provider(conn: &Connection, user_id: &str) -> Result<ProviderInfos, AppError> {
    if !queries::set_provider_verified(conn, user_id, true)? {
        return Err(AppError::NotFound(format!("provider {user_id}")));
    }
    tracing::info!(provider_id = %user_id, "provider verified");

    queries::get_provider_infos(conn, user_id)?
        .ok_or_else(|| AppError::NotFound(format!("provider {user_id}")))
}
