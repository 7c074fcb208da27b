pub mod migrations;
pub mod queries;

use anyhow::Context;
use rusqlite::Connection;

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    init_db_with_admin(path, "admin@conciergepro.com")
}

pub fn init_db_with_admin(path: &str, admin_email: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn)?;

    queries::seed_admin(&conn, admin_email).context("failed to seed administrator")?;

    Ok(conn)
}
