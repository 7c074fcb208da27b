use serde::{Deserialize, Serialize};

use super::User;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobCategory {
    Mechanic,
    Electrician,
    Plumber,
    Farmer,
    Laborer,
}

impl JobCategory {
    pub const ALL: [JobCategory; 5] = [
        JobCategory::Mechanic,
        JobCategory::Electrician,
        JobCategory::Plumber,
        JobCategory::Farmer,
        JobCategory::Laborer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobCategory::Mechanic => "mechanic",
            JobCategory::Electrician => "electrician",
            JobCategory::Plumber => "plumber",
            JobCategory::Farmer => "farmer",
            JobCategory::Laborer => "laborer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|job| job.as_str() == s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfos {
    pub user_id: String,
    pub business_name: String,
    pub job: JobCategory,
    pub description: String,
    pub intervention_radius_km: i64,
    pub is_verified: bool,
    pub is_active: bool,
    pub rating: f64,
}

impl ProviderInfos {
    pub const DEFAULT_RADIUS_KM: i64 = 30;
    pub const DEFAULT_RATING: f64 = 4.5;

    /// Profile created alongside a provider registration: active, not yet verified.
    pub fn new(user_id: &str, business_name: &str, job: JobCategory, description: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            business_name: business_name.to_string(),
            job,
            description: description.to_string(),
            intervention_radius_km: Self::DEFAULT_RADIUS_KM,
            is_verified: false,
            is_active: true,
            rating: Self::DEFAULT_RATING,
        }
    }
}

/// A provider user joined with its profile, as shown on the browse and detail screens.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderCard {
    #[serde(flatten)]
    pub user: User,
    pub info: ProviderInfos,
}
