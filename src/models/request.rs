use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    Paid,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Completed => "completed",
            RequestStatus::Paid => "paid",
        }
    }

    /// Label shown to users in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "en attente",
            RequestStatus::Accepted => "acceptée",
            RequestStatus::Rejected => "refusée",
            RequestStatus::Completed => "terminée",
            RequestStatus::Paid => "payée",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "accepted" => RequestStatus::Accepted,
            "rejected" => RequestStatus::Rejected,
            "completed" => RequestStatus::Completed,
            "paid" => RequestStatus::Paid,
            _ => RequestStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: String,
    pub client_id: String,
    pub provider_id: String,
    pub description: String,
    pub address: String,
    pub scheduled_at: NaiveDate,
    pub status: RequestStatus,
    pub price: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
