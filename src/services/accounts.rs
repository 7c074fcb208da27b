use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{JobCategory, ProviderInfos, User, UserRole};

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub role: UserRole,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub business_name: Option<String>,
    pub job: Option<JobCategory>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub landing_view: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: User,
    pub provider: Option<ProviderInfos>,
    pub navigation: Vec<&'static str>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub avatar: Option<String>,
    pub business_name: Option<String>,
    pub description: Option<String>,
    pub job: Option<JobCategory>,
    pub intervention_radius_km: Option<i64>,
    pub is_active: Option<bool>,
}

fn required(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn open_session(conn: &Connection, user: User) -> Result<Session, AppError> {
    let token = uuid::Uuid::new_v4().to_string();
    queries::create_session(conn, &token, &user.id)?;
    Ok(Session {
        token,
        landing_view: user.role.landing_view(),
        user,
    })
}

/// Creates a client or provider account and logs it in. Providers get their
/// profile in the same write.
pub fn register(conn: &mut Connection, reg: Registration) -> Result<Session, AppError> {
    if reg.role == UserRole::Admin {
        return Err(AppError::Forbidden(
            "administrator accounts cannot be registered".to_string(),
        ));
    }

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email: required(&reg.email, "email")?,
        name: required(&reg.name, "name")?,
        role: reg.role,
        phone: required(&reg.phone, "phone")?,
        address: required(&reg.address, "address")?,
        avatar: None,
        created_at: Utc::now().naive_utc(),
    };

    let provider = match reg.role {
        UserRole::Provider => {
            let business_name = required(reg.business_name.as_deref().unwrap_or(""), "business_name")?;
            let job = reg
                .job
                .ok_or_else(|| AppError::BadRequest("job is required".to_string()))?;
            let description = reg.description.as_deref().unwrap_or("").trim();
            Some(ProviderInfos::new(&user.id, &business_name, job, description))
        }
        _ => None,
    };

    if queries::get_user_by_email(conn, &user.email)?.is_some() {
        return Err(AppError::Conflict(format!(
            "an account already exists for {}",
            user.email
        )));
    }

    let tx = conn.transaction()?;
    queries::create_user(&tx, &user)?;
    if let Some(info) = &provider {
        queries::create_provider_infos(&tx, info)?;
    }
    tx.commit()?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "registered account");

    open_session(conn, user)
}

pub fn login(conn: &Connection, email: &str) -> Result<Session, AppError> {
    match queries::get_user_by_email(conn, email.trim())? {
        Some(user) => {
            tracing::info!(user_id = %user.id, "login");
            open_session(conn, user)
        }
        None => {
            tracing::warn!(email = %email, "login for unknown email");
            Err(AppError::Unauthorized)
        }
    }
}

pub fn logout(conn: &Connection, token: &str) -> Result<(), AppError> {
    queries::delete_session(conn, token)?;
    Ok(())
}

pub fn current_user(conn: &Connection, token: &str) -> Result<User, AppError> {
    queries::get_session_user(conn, token)?.ok_or(AppError::Unauthorized)
}

pub fn profile(conn: &Connection, user: User) -> Result<Profile, AppError> {
    let provider = match user.role {
        UserRole::Provider => queries::get_provider_infos(conn, &user.id)?,
        _ => None,
    };
    Ok(Profile {
        navigation: user.role.navigation(),
        user,
        provider,
    })
}

/// Applies a profile edit. Provider fields are ignored for other roles;
/// verification and rating are never self-editable.
pub fn update_profile(
    conn: &mut Connection,
    mut user: User,
    patch: ProfilePatch,
) -> Result<Profile, AppError> {
    if let Some(name) = patch.name {
        user.name = required(&name, "name")?;
    }
    if let Some(phone) = patch.phone {
        user.phone = required(&phone, "phone")?;
    }
    if let Some(address) = patch.address {
        user.address = required(&address, "address")?;
    }
    if let Some(avatar) = patch.avatar {
        user.avatar = Some(avatar).filter(|a| !a.trim().is_empty());
    }

    let mut provider = match user.role {
        UserRole::Provider => queries::get_provider_infos(conn, &user.id)?,
        _ => None,
    };
    if let Some(info) = provider.as_mut() {
        if let Some(business_name) = patch.business_name {
            info.business_name = required(&business_name, "business_name")?;
        }
        if let Some(description) = patch.description {
            info.description = description.trim().to_string();
        }
        if let Some(job) = patch.job {
            info.job = job;
        }
        if let Some(radius) = patch.intervention_radius_km {
            if radius <= 0 {
                return Err(AppError::BadRequest(
                    "intervention_radius_km must be positive".to_string(),
                ));
            }
            info.intervention_radius_km = radius;
        }
        if let Some(active) = patch.is_active {
            info.is_active = active;
        }
    }

    let tx = conn.transaction()?;
    queries::update_user(&tx, &user)?;
    if let Some(info) = &provider {
        queries::update_provider_infos(&tx, info)?;
    }
    tx.commit()?;

    tracing::info!(user_id = %user.id, "profile updated");

    Ok(Profile {
        navigation: user.role.navigation(),
        user,
        provider,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn client_registration(email: &str) -> Registration {
        Registration {
            role: UserRole::Client,
            name: "Aissatou".to_string(),
            email: email.to_string(),
            phone: "+221770000001".to_string(),
            address: "Médina, Dakar".to_string(),
            business_name: None,
            job: None,
            description: None,
        }
    }

    fn provider_registration(email: &str) -> Registration {
        Registration {
            role: UserRole::Provider,
            name: "Moussa".to_string(),
            email: email.to_string(),
            phone: "+221770000002".to_string(),
            address: "Plateau, Dakar".to_string(),
            business_name: Some("Plombier Dakar".to_string()),
            job: Some(JobCategory::Plumber),
            description: Some("Dépannage rapide".to_string()),
        }
    }

    #[test]
    fn test_registration_form_ignores_password() {
        let reg: Registration = serde_json::from_value(serde_json::json!({
            "role": "client",
            "name": "Aissatou",
            "email": "aissatou@example.com",
            "password": "secret",
            "phone": "+221770000001",
            "address": "Médina, Dakar",
        }))
        .unwrap();
        assert_eq!(reg.role, UserRole::Client);
        assert_eq!(reg.business_name, None);

        let mut conn = setup_db();
        let session = register(&mut conn, reg).unwrap();
        assert_eq!(login(&conn, "aissatou@example.com").unwrap().user.id, session.user.id);
    }

    #[test]
    fn test_register_client_opens_session() {
        let mut conn = setup_db();
        let session = register(&mut conn, client_registration("aissatou@example.com")).unwrap();
        assert_eq!(session.user.role, UserRole::Client);
        assert_eq!(session.landing_view, "home");

        let user = current_user(&conn, &session.token).unwrap();
        assert_eq!(user.id, session.user.id);
        assert!(queries::get_provider_infos(&conn, &user.id).unwrap().is_none());
    }

    #[test]
    fn test_register_provider_creates_profile() {
        let mut conn = setup_db();
        let session = register(&mut conn, provider_registration("moussa@example.com")).unwrap();
        assert_eq!(session.landing_view, "provider-dashboard");

        let info = queries::get_provider_infos(&conn, &session.user.id).unwrap().unwrap();
        assert_eq!(info.business_name, "Plombier Dakar");
        assert_eq!(info.intervention_radius_km, 30);
        assert!(info.is_active);
        assert!(!info.is_verified);
        assert_eq!(info.rating, 4.5);
    }

    #[test]
    fn test_register_provider_requires_business_fields() {
        let mut conn = setup_db();
        let mut reg = provider_registration("moussa@example.com");
        reg.job = None;
        assert!(matches!(register(&mut conn, reg), Err(AppError::BadRequest(_))));
        assert!(queries::get_user_by_email(&conn, "moussa@example.com").unwrap().is_none());
    }

    #[test]
    fn test_register_rejects_admin_and_duplicates() {
        let mut conn = setup_db();
        let mut reg = client_registration("x@example.com");
        reg.role = UserRole::Admin;
        assert!(matches!(register(&mut conn, reg), Err(AppError::Forbidden(_))));

        register(&mut conn, client_registration("dup@example.com")).unwrap();
        assert!(matches!(
            register(&mut conn, client_registration("dup@example.com")),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_login_logout() {
        let conn = setup_db();
        let session = login(&conn, "admin@conciergepro.com").unwrap();
        assert_eq!(session.landing_view, "admin-dashboard");

        logout(&conn, &session.token).unwrap();
        assert!(matches!(current_user(&conn, &session.token), Err(AppError::Unauthorized)));
        assert!(matches!(login(&conn, "nobody@example.com"), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_provider_updates_own_profile_only() {
        let mut conn = setup_db();
        let session = register(&mut conn, provider_registration("moussa@example.com")).unwrap();

        let patch = ProfilePatch {
            phone: Some("+221770009999".to_string()),
            is_active: Some(false),
            intervention_radius_km: Some(50),
            ..Default::default()
        };
        let profile = update_profile(&mut conn, session.user, patch).unwrap();
        assert_eq!(profile.user.phone, "+221770009999");

        let info = profile.provider.unwrap();
        assert!(!info.is_active);
        assert_eq!(info.intervention_radius_km, 50);
        assert!(!info.is_verified);

        let stored = queries::get_provider_infos(&conn, &info.user_id).unwrap().unwrap();
        assert!(!stored.is_active);
    }

    #[test]
    fn test_profile_rejects_blank_name() {
        let mut conn = setup_db();
        let session = register(&mut conn, client_registration("a@example.com")).unwrap();
        let patch = ProfilePatch {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_profile(&mut conn, session.user, patch),
            Err(AppError::BadRequest(_))
        ));
    }
}
