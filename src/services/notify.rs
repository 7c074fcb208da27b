use rusqlite::Connection;

use crate::db::queries;
use crate::state::AppState;

/// Stores a notification for `user_id` and pushes it to live subscribers.
/// Failures are logged, never returned.
pub fn notify(state: &AppState, conn: &Connection, user_id: &str, message: &str) {
    match queries::create_notification(conn, user_id, message) {
        Ok(notification) => {
            // No subscribers is fine
            let _ = state.notifications_tx.send(notification);
        }
        Err(e) => {
            tracing::error!(error = %e, user_id = %user_id, "failed to record notification");
        }
    }
}
