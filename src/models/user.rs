use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Provider,
    Client,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Provider => "provider",
            UserRole::Client => "client",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => UserRole::Admin,
            "provider" => UserRole::Provider,
            _ => UserRole::Client,
        }
    }

    /// View a user lands on right after logging in.
    pub fn landing_view(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin-dashboard",
            UserRole::Provider => "provider-dashboard",
            UserRole::Client => "home",
        }
    }

    pub fn navigation(&self) -> Vec<&'static str> {
        match self {
            UserRole::Admin => vec!["home", "admin-dashboard"],
            UserRole::Provider => vec!["home", "provider-dashboard"],
            UserRole::Client => vec!["home", "client-dashboard"],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub phone: String,
    pub address: String,
    pub avatar: Option<String>,
    pub created_at: NaiveDateTime,
}
