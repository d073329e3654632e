//! Startup wiring for baseline tier seeding.

mod startup;

pub use startup::{StartupSeedingError, seed_tiers_on_startup};
