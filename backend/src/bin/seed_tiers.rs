//! Apply migrations and seed the baseline tiers into an empty database.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use landlord_backend::domain::TierSeeder;
use landlord_backend::domain::ports::SeedingResult;
use landlord_backend::outbound::persistence::{
    DbPool, DieselTierRepository, PoolConfig, run_pending_migrations,
};
use tokio::runtime::Builder;

/// `seed-tiers` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seed-tiers",
    about = "Insert the baseline subscription tiers when the tier table is empty",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Skip applying pending migrations first.
    #[arg(long = "skip-migrations")]
    skip_migrations: bool,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url, env::var("DATABASE_URL").ok())?;

    if !args.skip_migrations {
        run_pending_migrations(&database_url)
            .await
            .map_err(|error| io::Error::other(format!("apply migrations: {error}")))?;
    }

    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(1))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let seeder = TierSeeder::new(Arc::new(DieselTierRepository::new(pool)));
    let outcome = seeder
        .seed_baseline()
        .await
        .map_err(|error| io::Error::other(format!("seed tiers: {error}")))?;

    let status = match outcome.result {
        SeedingResult::Applied => "applied",
        SeedingResult::AlreadySeeded => "already_seeded",
    };
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "status={status}")?;
    writeln!(stdout, "tier_count={}", outcome.tier_count)
}

fn resolve_database_url(explicit: Option<String>, from_env: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    match from_env {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "DATABASE_URL must not be empty",
        )),
        None => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL missing: set --database-url or DATABASE_URL",
        )),
    }
}
