//! Backend entry-point: loads settings, prepares persistence, seeds the
//! baseline tiers and serves the REST API.

mod server;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use landlord_backend::inbound::http::health::HealthState;
use landlord_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use landlord_backend::settings::AppSettings;
use ortho_config::OrthoConfig;
use server::{ServerConfig, create_server, seed_tiers};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;

    let config = build_server_config(&settings).await?;
    seed_tiers(&settings, config.persistence())
        .await
        .map_err(std::io::Error::other)?;

    let health_state = web::Data::new(HealthState::new());
    info!(addr = %config.bind_addr(), "starting HTTP server");
    create_server(health_state, &config)?.await
}

async fn build_server_config(settings: &AppSettings) -> std::io::Result<ServerConfig> {
    let config = ServerConfig::new(settings.bind_addr());
    let Some(database_url) = settings.database_url() else {
        warn!("no database URL configured; tiers and users are held in memory");
        return Ok(config);
    };

    let applied = run_pending_migrations(&database_url)
        .await
        .map_err(std::io::Error::other)?;
    info!(applied, "database migrations applied");

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.db_max_connections()))
        .await
    .map_err(std::io::Error::other)?;

    Ok(config.with_db_pool(pool))
}
