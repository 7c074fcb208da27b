use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::Connection;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{RequestStatus, ServiceRequest, User, UserRole};
use crate::services::lifecycle::{self, RequestAction};
use crate::services::notify::notify;
use crate::state::AppState;

/// Booking form. Anything else the caller sends, status included, is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingForm {
    pub provider_id: String,
    pub description: String,
    pub scheduled_at: String,
}

/// Accepts a calendar date (`2030-01-15`) or a date-time whose date part is kept.
pub fn parse_schedule_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| chrono::DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
                .ok()
                .map(|dt| dt.date())
        })
}

pub fn create_request(
    state: &AppState,
    conn: &Connection,
    client: &User,
    form: BookingForm,
) -> Result<ServiceRequest, AppError> {
    if client.role != UserRole::Client {
        return Err(AppError::Forbidden("only clients can book a provider".to_string()));
    }

    let description = form.description.trim();
    if description.is_empty() {
        return Err(AppError::BadRequest("description is required".to_string()));
    }
    let scheduled_at = parse_schedule_date(&form.scheduled_at).ok_or_else(|| {
        AppError::BadRequest(format!("invalid scheduled_at: {}", form.scheduled_at))
    })?;

    let provider = queries::get_provider_infos(conn, &form.provider_id)?
        .ok_or_else(|| AppError::NotFound(format!("provider {}", form.provider_id)))?;
    if !provider.is_active {
        return Err(AppError::Conflict(format!(
            "{} is not taking bookings",
            provider.business_name
        )));
    }

    let now = Utc::now().naive_utc();
    let request = ServiceRequest {
        id: uuid::Uuid::new_v4().to_string(),
        client_id: client.id.clone(),
        provider_id: provider.user_id.clone(),
        description: description.to_string(),
        address: client.address.clone(),
        scheduled_at,
        status: RequestStatus::Pending,
        price: None,
        created_at: now,
        updated_at: now,
    };
    queries::create_request(conn, &request)?;

    tracing::info!(
        request_id = %request.id,
        client_id = %client.id,
        provider_id = %request.provider_id,
        "service request created"
    );

    notify(
        state,
        conn,
        &request.provider_id,
        &format!(
            "Nouvelle demande de {} pour le {} : \"{}\"",
            client.name,
            request.scheduled_at.format("%d/%m/%Y"),
            request.description
        ),
    );

    Ok(request)
}

/// Applies a provider-side lifecycle action (accept, reject, complete).
pub fn transition(
    state: &AppState,
    conn: &Connection,
    actor: &User,
    request_id: &str,
    action: RequestAction,
) -> Result<ServiceRequest, AppError> {
    if action == RequestAction::Pay {
        return Err(AppError::BadRequest(
            "payments go through the pay endpoint".to_string(),
        ));
    }

    let mut request = queries::get_request(conn, request_id)?
        .ok_or_else(|| AppError::NotFound(format!("request {request_id}")))?;

    lifecycle::authorize(action, actor, &request)?;
    let next = lifecycle::next_status(request.status, action)?;

    if !queries::update_request_status(conn, request_id, request.status, next)? {
        tracing::warn!(request_id = %request_id, action = action.as_str(), "request changed concurrently");
        return Err(AppError::Conflict(
            "request was modified by someone else, reload and retry".to_string(),
        ));
    }

    tracing::info!(
        request_id = %request_id,
        from = request.status.as_str(),
        to = next.as_str(),
        "request status changed"
    );

    request.status = next;
    request.updated_at = Utc::now().naive_utc();

    notify(
        state,
        conn,
        &request.client_id,
        &format!("Votre demande \"{}\" a été {}", request.description, next.label()),
    );

    Ok(request)
}
