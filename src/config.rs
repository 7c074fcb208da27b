use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_email: String,
    /// Fixed price charged by the simulated Wave checkout, in FCFA.
    pub payment_amount: i64,
    pub checkout_delay_ms: u64,
    pub confirm_delay_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "conciergepro.db".to_string()),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@conciergepro.com".to_string()),
            payment_amount: env::var("PAYMENT_AMOUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15000),
            checkout_delay_ms: env::var("CHECKOUT_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            confirm_delay_ms: env::var("CONFIRM_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1500),
        }
    }
}
