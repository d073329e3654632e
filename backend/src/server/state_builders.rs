//! Builders wiring the tier service onto the configured adapters.

use std::sync::Arc;

use actix_web::web;

use landlord_backend::domain::TierService;
use landlord_backend::domain::ports::TierRepository;
use landlord_backend::inbound::http::state::HttpState;
use landlord_backend::outbound::memory::{InMemoryTierRepository, InMemoryUserDirectory};
use landlord_backend::outbound::persistence::{DieselTierRepository, DieselUserDirectory};
use landlord_backend::settings::AppSettings;
use landlord_backend::tier_seeding::{StartupSeedingError, seed_tiers_on_startup};

use super::config::Persistence;

/// Build the HTTP state from the configured backing store.
pub fn build_http_state(persistence: &Persistence) -> web::Data<HttpState> {
    let state = match persistence {
        Persistence::Postgres(pool) => HttpState::from_service(Arc::new(TierService::new(
            Arc::new(DieselTierRepository::new(pool.clone())),
            Arc::new(DieselUserDirectory::new(pool.clone())),
        ))),
        Persistence::Memory(store) => HttpState::from_service(Arc::new(TierService::new(
            Arc::new(InMemoryTierRepository::new(store.clone())),
            Arc::new(InMemoryUserDirectory::new(store.clone())),
        ))),
    };
    web::Data::new(state)
}

/// Seed the baseline tiers into the configured backing store.
///
/// # Errors
/// Propagates [`StartupSeedingError`] from the seeder.
pub async fn seed_tiers(
    settings: &AppSettings,
    persistence: &Persistence,
) -> Result<(), StartupSeedingError> {
    match persistence {
        Persistence::Postgres(pool) => {
            seed_with(settings, DieselTierRepository::new(pool.clone())).await
        }
        Persistence::Memory(store) => {
            seed_with(settings, InMemoryTierRepository::new(store.clone())).await
        }
    }
}

async fn seed_with<R: TierRepository>(
    settings: &AppSettings,
    repository: R,
) -> Result<(), StartupSeedingError> {
    seed_tiers_on_startup(settings, Arc::new(repository))
        .await
        .map(|_| ())
}
