//! Service entry-point: loads settings, prepares the database, and serves the
//! users API with health probes and OpenAPI docs.

mod server;

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use user_age_api::domain::UserService;
use user_age_api::inbound::http::health::HealthState;
use user_age_api::inbound::http::state::HttpState;
use user_age_api::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use user_age_api::settings::AppSettings;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

/// Apply embedded migrations on a blocking thread so the runtime stays free.
async fn prepare_schema(database_url: &str) -> std::io::Result<()> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
        .await
        .map_err(|e| std::io::Error::other(format!("migration task failed: {e}")))?
        .map_err(std::io::Error::other)?;
    info!(applied, "database schema ready");
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let settings = AppSettings::load_from_args(std::env::args_os()).map_err(std::io::Error::other)?;

    prepare_schema(settings.database_url()).await?;

    let pool = DbPool::new(PoolConfig::new(settings.database_url()))
        .await
        .map_err(std::io::Error::other)?;
    let service = Arc::new(UserService::new(
        Arc::new(DieselUserRepository::new(pool)),
        Arc::new(DefaultClock),
    ));
    let http_state = HttpState::new(service.clone(), service);

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(settings.bind_addr(), http_state);
    info!(addr = %config.bind_addr(), "starting server");

    let server = create_server(health_state.clone(), config)?;
    let result = server.await;

    health_state.mark_unhealthy();
    info!("server stopped");
    result
}
