use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::Notification;
use crate::services::payment::PaymentGateway;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub payments: Box<dyn PaymentGateway>,
    /// Request ids with a payment currently between checkout and confirmation.
    pub payments_in_flight: Mutex<HashSet<String>>,
    pub notifications_tx: broadcast::Sender<Notification>,
}

impl AppState {
    pub fn new(conn: Connection, config: AppConfig, payments: Box<dyn PaymentGateway>) -> Self {
        let (notifications_tx, _) = broadcast::channel(256);
        Self {
            db: Arc::new(Mutex::new(conn)),
            config,
            payments,
            payments_in_flight: Mutex::new(HashSet::new()),
            notifications_tx,
        }
    }

    pub fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("database lock poisoned")))
    }
}
