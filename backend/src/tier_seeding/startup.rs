//! Startup seeding orchestration.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::domain::ports::{SeedingResult, TierRepository};
use crate::domain::{TierSeedOutcome, TierSeeder, TierSeedingError};
use crate::settings::AppSettings;

/// Errors returned while executing startup seeding.
#[derive(Debug, Error)]
pub enum StartupSeedingError {
    /// Baseline construction or persistence failed.
    #[error("tier seeding error: {0}")]
    Seeding(#[from] TierSeedingError),
}

/// Seed the baseline tiers unless disabled by configuration.
///
/// Returns `None` when seeding is skipped.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use landlord_backend::outbound::memory::{InMemoryStore, InMemoryTierRepository};
/// use landlord_backend::settings::AppSettings;
/// use landlord_backend::tier_seeding::seed_tiers_on_startup;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = AppSettings {
///     host: None,
///     port: None,
///     database_url: None,
///     db_max_connections: None,
///     skip_tier_seeding: false,
/// };
/// let repository = Arc::new(InMemoryTierRepository::new(InMemoryStore::default()));
/// let outcome = seed_tiers_on_startup(&settings, repository).await?;
/// assert!(outcome.is_some());
/// # Ok(())
/// # }
/// ```
pub async fn seed_tiers_on_startup<R>(
    settings: &AppSettings,
    repository: Arc<R>,
) -> Result<Option<TierSeedOutcome>, StartupSeedingError>
where
    R: TierRepository,
{
    if settings.skip_tier_seeding {
        info!(reason = "disabled", "tier seeding skipped");
        return Ok(None);
    }

    let outcome = TierSeeder::new(repository).seed_baseline().await?;
    match outcome.result {
        SeedingResult::Applied => {
            info!(tier_count = outcome.tier_count, "baseline tiers seeded");
        }
        SeedingResult::AlreadySeeded => {
            info!("tier store already populated; seeding skipped");
        }
    }

    Ok(Some(outcome))
}
