use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use conciergepro::config::AppConfig;
use conciergepro::db;
use conciergepro::handlers;
use conciergepro::services::payment::wave::WaveSimulator;
use conciergepro::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db_with_admin(&config.database_url, &config.admin_email)?;

    tracing::info!(
        amount = config.payment_amount,
        checkout_delay_ms = config.checkout_delay_ms,
        confirm_delay_ms = config.confirm_delay_ms,
        "using simulated Wave payments"
    );
    let payments = WaveSimulator::new(
        Duration::from_millis(config.checkout_delay_ms),
        Duration::from_millis(config.confirm_delay_ms),
    );

    let state = Arc::new(AppState::new(conn, config.clone(), Box::new(payments)));

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route(
            "/api/me",
            get(handlers::auth::me).patch(handlers::auth::update_me),
        )
        .route("/api/providers", get(handlers::providers::list_providers))
        .route("/api/providers/:id", get(handlers::providers::get_provider))
        .route("/api/requests", post(handlers::requests::create_request))
        .route(
            "/api/requests/:id/accept",
            post(handlers::requests::accept_request),
        )
        .route(
            "/api/requests/:id/reject",
            post(handlers::requests::reject_request),
        )
        .route(
            "/api/requests/:id/complete",
            post(handlers::requests::complete_request),
        )
        .route("/api/requests/:id/pay", post(handlers::requests::pay_request))
        .route(
            "/api/client/dashboard",
            get(handlers::requests::client_dashboard),
        )
        .route(
            "/api/provider/dashboard",
            get(handlers::requests::provider_dashboard),
        )
        .route("/api/admin/stats", get(handlers::admin::get_stats))
        .route("/api/admin/users", get(handlers::admin::get_users))
        .route("/api/admin/providers", get(handlers::admin::get_providers))
        .route(
            "/api/admin/providers/:id/verify",
            post(handlers::admin::verify_provider),
        )
        .route(
            "/api/admin/transactions",
            get(handlers::admin::get_transactions),
        )
        .route(
            "/api/notifications",
            get(handlers::notifications::get_notifications),
        )
        .route(
            "/api/notifications/read",
            post(handlers::notifications::mark_read),
        )
        .route("/api/events", get(handlers::events::events_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
