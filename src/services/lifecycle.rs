//! Service request lifecycle.
//!
//! ```text
//! pending ──accept──▶ accepted ──complete──▶ completed ──pay──▶ paid
//!    │
//!    └──reject──▶ rejected
//! ```
//!
//! `rejected` and `paid` are terminal. The provider named on a request drives
//! accept, reject and complete; the client named on it drives pay.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{RequestStatus, ServiceRequest, User, UserRole};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    Accept,
    Reject,
    Complete,
    Pay,
}

impl RequestAction {
    pub const ALL: [RequestAction; 4] = [
        RequestAction::Accept,
        RequestAction::Reject,
        RequestAction::Complete,
        RequestAction::Pay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestAction::Accept => "accept",
            RequestAction::Reject => "reject",
            RequestAction::Complete => "complete",
            RequestAction::Pay => "pay",
        }
    }

    /// Role that may perform the action on a request it is named on.
    pub fn actor_role(&self) -> UserRole {
        match self {
            RequestAction::Pay => UserRole::Client,
            _ => UserRole::Provider,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {} a request that is {}", .action.as_str(), .from.as_str())]
    InvalidTransition {
        from: RequestStatus,
        action: RequestAction,
    },

    #[error("only the {} named on this request may {} it", .expected.as_str(), .action.as_str())]
    NotAllowed {
        action: RequestAction,
        expected: UserRole,
    },
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
            TransitionError::NotAllowed { .. } => AppError::Forbidden(err.to_string()),
        }
    }
}

pub fn next_status(
    current: RequestStatus,
    action: RequestAction,
) -> Result<RequestStatus, TransitionError> {
    match (current, action) {
        (RequestStatus::Pending, RequestAction::Accept) => Ok(RequestStatus::Accepted),
        (RequestStatus::Pending, RequestAction::Reject) => Ok(RequestStatus::Rejected),
        (RequestStatus::Accepted, RequestAction::Complete) => Ok(RequestStatus::Completed),
        (RequestStatus::Completed, RequestAction::Pay) => Ok(RequestStatus::Paid),
        (from, action) => Err(TransitionError::InvalidTransition { from, action }),
    }
}

pub fn authorize(
    action: RequestAction,
    actor: &User,
    request: &ServiceRequest,
) -> Result<(), TransitionError> {
    let expected = action.actor_role();
    let party = match expected {
        UserRole::Client => &request.client_id,
        _ => &request.provider_id,
    };

    if actor.role == expected && actor.id == *party {
        Ok(())
    } else {
        Err(TransitionError::NotAllowed { action, expected })
    }
}

/// Actions `actor` may take on `request` in its current state.
pub fn allowed_actions(request: &ServiceRequest, actor: &User) -> Vec<RequestAction> {
    RequestAction::ALL
        .into_iter()
        .filter(|action| authorize(*action, actor, request).is_ok())
        .filter(|action| next_status(request.status, *action).is_ok())
        .collect()
}
