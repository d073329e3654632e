//! Application settings loaded via OrthoConfig.
//!
//! Values come from `LANDLORD_*` environment variables, CLI flags or a
//! config file. The database URL additionally falls back to the
//! conventional `DATABASE_URL` variable.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::DEFAULT_MAX_SIZE;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 8080;
const DATABASE_URL_FALLBACK: &str = "DATABASE_URL";

/// Configuration values for the HTTP server and its persistence backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LANDLORD")]
pub struct AppSettings {
    /// Interface address to bind.
    pub host: Option<IpAddr>,
    /// TCP port to bind.
    pub port: Option<u16>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Leave the tier table untouched at startup.
    #[ortho_config(default = false)]
    pub skip_tier_seeding: bool,
}

impl AppSettings {
    /// Socket address the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(DEFAULT_HOST),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Configured database URL, or `DATABASE_URL` when unset.
    ///
    /// Blank values are treated as absent.
    #[must_use]
    pub fn database_url(&self) -> Option<String> {
        self.database_url
            .clone()
            .or_else(|| env::var(DATABASE_URL_FALLBACK).ok())
            .filter(|url| !url.trim().is_empty())
    }

    /// Pool size, falling back to the pool default.
    #[must_use]
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_MAX_SIZE)
    }
}
