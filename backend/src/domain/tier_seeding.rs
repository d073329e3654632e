//! Baseline tier seeding.
//!
//! Fills an empty tier store with the four baseline tiers. A store that
//! already holds any tier is left untouched: seeding never merges.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::ports::{SeedingResult, TierRepository, TierRepositoryError};
use crate::domain::{NewTier, Price, PropertyQuota, TierName, TierValidationError};

/// Result of a seeding attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSeedOutcome {
    /// Number of tiers in the baseline set.
    pub tier_count: usize,
    /// Whether rows were written.
    pub result: SeedingResult,
}

/// Errors raised while seeding tiers.
#[derive(Debug, Error)]
pub enum TierSeedingError {
    /// A baseline row failed validation.
    #[error("baseline tier is invalid: {0}")]
    InvalidBaseline(#[from] TierValidationError),
    /// Persistence adapter failed while seeding.
    #[error("tier seeding persistence error: {0}")]
    Persistence(#[from] TierRepositoryError),
}

/// The baseline tiers, in insertion order.
///
/// | name | price | max properties | sort order | default |
/// |---|---|---|---|---|
/// | Free | 0 | 1 | 0 | yes |
/// | Basic | 4.99 | 5 | 1 | no |
/// | Professional | 14.99 | 20 | 2 | no |
/// | Enterprise | 29.99 | unlimited | 3 | no |
pub fn baseline_tiers() -> Result<Vec<NewTier>, TierValidationError> {
    let rows = [
        ("Free", 0, 1, true),
        ("Basic", 499, 5, false),
        ("Professional", 1499, 20, false),
        ("Enterprise", 2999, 0, false),
    ];
    let mut tiers = Vec::with_capacity(rows.len());
    for (sort_order, (name, minor_units, max_properties, is_default)) in (0..).zip(rows) {
        let tier = NewTier::new(
            TierName::new(name)?,
            Price::from_minor_units(minor_units),
            PropertyQuota::new(max_properties),
        )
        .with_sort_order(sort_order)
        .with_default(is_default);
        tiers.push(tier);
    }
    Ok(tiers)
}

/// Seeds the baseline tiers into an empty store.
#[derive(Clone)]
pub struct TierSeeder<R> {
    repository: Arc<R>,
}

impl<R> TierSeeder<R> {
    /// Create a seeder over the given repository.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R> TierSeeder<R>
where
    R: TierRepository,
{
    /// Insert the baseline tiers when the store holds none.
    ///
    /// # Errors
    ///
    /// Returns [`TierSeedingError::Persistence`] when counting or inserting
    /// fails.
    pub async fn seed_baseline(&self) -> Result<TierSeedOutcome, TierSeedingError> {
        let tiers = baseline_tiers()?;
        let tier_count = tiers.len();

        if self.repository.count().await? > 0 {
            return Ok(TierSeedOutcome {
                tier_count,
                result: SeedingResult::AlreadySeeded,
            });
        }

        let result = self.repository.insert_many(tiers).await?;
        Ok(TierSeedOutcome { tier_count, result })
    }
}
