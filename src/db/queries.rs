use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{
    JobCategory, Notification, ProviderInfos, RequestStatus, ServiceRequest, Transaction,
    TransactionStatus, User, UserRole,
};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub const ADMIN_ID: &str = "admin-1";

fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TS_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

fn now_str() -> String {
    format_ts(&Utc::now().naive_utc())
}

// ── Users ──

const USER_COLUMNS: &str = "id, email, name, role, phone, address, avatar, created_at";

fn parse_user_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let role_str: String = row.get(3)?;
    let created_at_str: String = row.get(7)?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        role: UserRole::parse(&role_str),
        phone: row.get(4)?,
        address: row.get(5)?,
        avatar: row.get(6)?,
        created_at: parse_ts(&created_at_str),
    })
}

pub fn create_user(conn: &Connection, user: &User) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, email, name, role, phone, address, avatar, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user.id,
            user.email,
            user.name,
            user.role.as_str(),
            user.phone,
            user.address,
            user.avatar,
            format_ts(&user.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            parse_user_row,
        )
        .optional()?;
    Ok(user)
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            parse_user_row,
        )
        .optional()?;
    Ok(user)
}

pub fn list_users(conn: &Connection) -> anyhow::Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, id ASC"
    ))?;
    let rows = stmt.query_map([], parse_user_row)?;

    let mut users = vec![];
    for row in rows {
        users.push(row?);
    }
    Ok(users)
}

pub fn update_user(conn: &Connection, user: &User) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET name = ?1, phone = ?2, address = ?3, avatar = ?4 WHERE id = ?5",
        params![user.name, user.phone, user.address, user.avatar, user.id],
    )?;
    Ok(count > 0)
}

pub fn count_users(conn: &Connection, role: Option<UserRole>) -> anyhow::Result<i64> {
    let count: i64 = match role {
        Some(role) => conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = ?1",
            params![role.as_str()],
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?,
    };
    Ok(count)
}

/// Inserts the administrator account when the store holds no user yet.
pub fn seed_admin(conn: &Connection, email: &str) -> anyhow::Result<bool> {
    if count_users(conn, None)? > 0 {
        return Ok(false);
    }

    let admin = User {
        id: ADMIN_ID.to_string(),
        email: email.to_string(),
        name: "Admin ConciergePro".to_string(),
        role: UserRole::Admin,
        phone: "00000000".to_string(),
        address: "Dakar, Sénégal".to_string(),
        avatar: None,
        created_at: Utc::now().naive_utc(),
    };
    create_user(conn, &admin)?;
    tracing::info!(email = %email, "seeded administrator account");
    Ok(true)
}

// ── Provider Infos ──

const PROVIDER_COLUMNS: &str = "user_id, business_name, job, description, intervention_radius_km, is_verified, is_active, rating";

fn parse_provider_row(row: &rusqlite::Row) -> rusqlite::Result<ProviderInfos> {
    let job_str: String = row.get(2)?;
    Ok(ProviderInfos {
        user_id: row.get(0)?,
        business_name: row.get(1)?,
        job: JobCategory::parse(&job_str).unwrap_or(JobCategory::Laborer),
        description: row.get(3)?,
        intervention_radius_km: row.get(4)?,
        is_verified: row.get::<_, i32>(5)? != 0,
        is_active: row.get::<_, i32>(6)? != 0,
        rating: row.get(7)?,
    })
}

pub fn create_provider_infos(conn: &Connection, info: &ProviderInfos) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO provider_infos (user_id, business_name, job, description, intervention_radius_km, is_verified, is_active, rating)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            info.user_id,
            info.business_name,
            info.job.as_str(),
            info.description,
            info.intervention_radius_km,
            info.is_verified as i32,
            info.is_active as i32,
            info.rating,
        ],
    )?;
    Ok(())
}

pub fn get_provider_infos(conn: &Connection, user_id: &str) -> anyhow::Result<Option<ProviderInfos>> {
    let info = conn
        .query_row(
            &format!("SELECT {PROVIDER_COLUMNS} FROM provider_infos WHERE user_id = ?1"),
            params![user_id],
            parse_provider_row,
        )
        .optional()?;
    Ok(info)
}

pub fn list_provider_infos(conn: &Connection) -> anyhow::Result<Vec<ProviderInfos>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROVIDER_COLUMNS} FROM provider_infos ORDER BY rowid ASC"
    ))?;
    let rows = stmt.query_map([], parse_provider_row)?;

    let mut infos = vec![];
    for row in rows {
        infos.push(row?);
    }
    Ok(infos)
}

/// Writes the provider-editable fields. Verification and rating are left untouched.
pub fn update_provider_infos(conn: &Connection, info: &ProviderInfos) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE provider_infos SET business_name = ?1, job = ?2, description = ?3,
           intervention_radius_km = ?4, is_active = ?5
         WHERE user_id = ?6",
        params![
            info.business_name,
            info.job.as_str(),
            info.description,
            info.intervention_radius_km,
            info.is_active as i32,
            info.user_id,
        ],
    )?;
    Ok(count > 0)
}

pub fn set_provider_verified(conn: &Connection, user_id: &str, verified: bool) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE provider_infos SET is_verified = ?1 WHERE user_id = ?2",
        params![verified as i32, user_id],
    )?;
    Ok(count > 0)
}

pub fn count_providers_by_verification(conn: &Connection, verified: bool) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM provider_infos WHERE is_verified = ?1",
        params![verified as i32],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ── Service Requests ──

const REQUEST_COLUMNS: &str = "id, client_id, provider_id, description, address, scheduled_at, status, price, created_at, updated_at";

fn parse_request_row(row: &rusqlite::Row) -> rusqlite::Result<ServiceRequest> {
    let scheduled_at_str: String = row.get(5)?;
    let status_str: String = row.get(6)?;
    let created_at_str: String = row.get(8)?;
    let updated_at_str: String = row.get(9)?;

    let created_at = parse_ts(&created_at_str);
    let scheduled_at = NaiveDate::parse_from_str(&scheduled_at_str, DATE_FORMAT)
        .unwrap_or_else(|_| created_at.date());

    Ok(ServiceRequest {
        id: row.get(0)?,
        client_id: row.get(1)?,
        provider_id: row.get(2)?,
        description: row.get(3)?,
        address: row.get(4)?,
        scheduled_at,
        status: RequestStatus::parse(&status_str),
        price: row.get(7)?,
        created_at,
        updated_at: parse_ts(&updated_at_str),
    })
}

pub fn create_request(conn: &Connection, req: &ServiceRequest) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO service_requests (id, client_id, provider_id, description, address, scheduled_at, status, price, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            req.id,
            req.client_id,
            req.provider_id,
            req.description,
            req.address,
            req.scheduled_at.format(DATE_FORMAT).to_string(),
            req.status.as_str(),
            req.price,
            format_ts(&req.created_at),
            format_ts(&req.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_request(conn: &Connection, id: &str) -> anyhow::Result<Option<ServiceRequest>> {
    let req = conn
        .query_row(
            &format!("SELECT {REQUEST_COLUMNS} FROM service_requests WHERE id = ?1"),
            params![id],
            parse_request_row,
        )
        .optional()?;
    Ok(req)
}

pub fn list_requests_for_client(conn: &Connection, client_id: &str) -> anyhow::Result<Vec<ServiceRequest>> {
    list_requests_where(conn, "client_id", client_id)
}

pub fn list_requests_for_provider(conn: &Connection, provider_id: &str) -> anyhow::Result<Vec<ServiceRequest>> {
    list_requests_where(conn, "provider_id", provider_id)
}

fn list_requests_where(conn: &Connection, column: &str, value: &str) -> anyhow::Result<Vec<ServiceRequest>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REQUEST_COLUMNS} FROM service_requests WHERE {column} = ?1 ORDER BY created_at ASC, rowid ASC"
    ))?;
    let rows = stmt.query_map(params![value], parse_request_row)?;

    let mut requests = vec![];
    for row in rows {
        requests.push(row?);
    }
    Ok(requests)
}

/// Moves a request to `to` only if it is still in `from`. Returns whether a row changed.
pub fn update_request_status(
    conn: &Connection,
    id: &str,
    from: RequestStatus,
    to: RequestStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE service_requests SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
        params![to.as_str(), now_str(), id, from.as_str()],
    )?;
    Ok(count > 0)
}

/// Settles a completed request as paid and records the price.
pub fn mark_request_paid(conn: &Connection, id: &str, price: i64) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE service_requests SET status = ?1, price = ?2, updated_at = ?3 WHERE id = ?4 AND status = ?5",
        params![
            RequestStatus::Paid.as_str(),
            price,
            now_str(),
            id,
            RequestStatus::Completed.as_str(),
        ],
    )?;
    Ok(count > 0)
}

// ── Transactions ──

const TRANSACTION_COLUMNS: &str = "id, request_id, amount, status, reference, created_at";

fn parse_transaction_row(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
    let status_str: String = row.get(3)?;
    let created_at_str: String = row.get(5)?;
    Ok(Transaction {
        id: row.get(0)?,
        request_id: row.get(1)?,
        amount: row.get(2)?,
        status: TransactionStatus::parse(&status_str),
        reference: row.get(4)?,
        created_at: parse_ts(&created_at_str),
    })
}

pub fn create_transaction(conn: &Connection, tx: &Transaction) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO transactions (id, request_id, amount, status, reference, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            tx.id,
            tx.request_id,
            tx.amount,
            tx.status.as_str(),
            tx.reference,
            format_ts(&tx.created_at),
        ],
    )?;
    Ok(())
}

pub fn list_transactions(conn: &Connection, limit: i64) -> anyhow::Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY created_at DESC, rowid DESC LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit], parse_transaction_row)?;

    let mut txs = vec![];
    for row in rows {
        txs.push(row?);
    }
    Ok(txs)
}

pub fn list_transactions_for_request(conn: &Connection, request_id: &str) -> anyhow::Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE request_id = ?1 ORDER BY created_at ASC, rowid ASC"
    ))?;
    let rows = stmt.query_map(params![request_id], parse_transaction_row)?;

    let mut txs = vec![];
    for row in rows {
        txs.push(row?);
    }
    Ok(txs)
}

pub fn set_transaction_status(
    conn: &Connection,
    reference: &str,
    status: TransactionStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE transactions SET status = ?1 WHERE reference = ?2",
        params![status.as_str(), reference],
    )?;
    Ok(count > 0)
}

// ── Sessions ──

pub fn create_session(conn: &Connection, token: &str, user_id: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO sessions (token, user_id) VALUES (?1, ?2)",
        params![token, user_id],
    )?;
    Ok(())
}

pub fn get_session_user(conn: &Connection, token: &str) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT u.id, u.email, u.name, u.role, u.phone, u.address, u.avatar, u.created_at
             FROM sessions s INNER JOIN users u ON u.id = s.user_id
             WHERE s.token = ?1",
            params![token],
            parse_user_row,
        )
        .optional()?;
    Ok(user)
}

pub fn delete_session(conn: &Connection, token: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(count > 0)
}

// ── Notifications ──

fn parse_notification_row(row: &rusqlite::Row) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        message: row.get(2)?,
        is_read: row.get::<_, i32>(3)? != 0,
        created_at: row.get(4)?,
    })
}

pub fn create_notification(conn: &Connection, user_id: &str, message: &str) -> anyhow::Result<Notification> {
    let created_at = now_str();
    conn.execute(
        "INSERT INTO notifications (user_id, message, created_at) VALUES (?1, ?2, ?3)",
        params![user_id, message, created_at],
    )?;
    Ok(Notification {
        id: conn.last_insert_rowid(),
        user_id: user_id.to_string(),
        message: message.to_string(),
        is_read: false,
        created_at,
    })
}

pub fn list_notifications(conn: &Connection, user_id: &str, limit: i64) -> anyhow::Result<Vec<Notification>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, message, is_read, created_at
         FROM notifications WHERE user_id = ?1
         ORDER BY id DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![user_id, limit], parse_notification_row)?;

    let mut notifications = vec![];
    for row in rows {
        notifications.push(row?);
    }
    Ok(notifications)
}

pub fn get_notifications_since(conn: &Connection, user_id: &str, since_id: i64) -> anyhow::Result<Vec<Notification>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, message, is_read, created_at
         FROM notifications WHERE user_id = ?1 AND id > ?2
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![user_id, since_id], parse_notification_row)?;

    let mut notifications = vec![];
    for row in rows {
        notifications.push(row?);
    }
    Ok(notifications)
}

pub fn mark_notifications_read(conn: &Connection, user_id: &str) -> anyhow::Result<usize> {
    let count = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE user_id = ?1 AND is_read = 0",
        params![user_id],
    )?;
    Ok(count)
}
