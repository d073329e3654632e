//! Driven port for tier persistence.

use async_trait::async_trait;

use crate::domain::{NewTier, Tier, TierId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by tier repository adapters.
    pub enum TierRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } => "tier repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "tier repository query failed: {message}",
        /// The tier targeted by a save no longer exists.
        Missing { tier_id: i64 } => "tier {tier_id} does not exist",
        /// Users still reference the tier being deleted.
        TierInUse { tier_id: i64 } => "tier {tier_id} is referenced by users",
    }
}

/// Outcome of a bulk insert into an empty store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedingResult {
    /// Rows were inserted.
    Applied,
    /// The store already held tiers; nothing was written.
    AlreadySeeded,
}

/// Port for tier storage.
///
/// # Default exclusivity
///
/// [`insert`](Self::insert) and [`save`](Self::save) must clear the default
/// flag on every other tier in the same atomic write whenever the tier being
/// written is the default. Callers never clear defaults themselves.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TierRepository: Send + Sync {
    /// Every tier ordered by `(sort_order, id)` ascending.
    async fn list_ordered(&self) -> Result<Vec<Tier>, TierRepositoryError>;

    /// Fetch a tier by id.
    async fn find_by_id(&self, id: TierId) -> Result<Option<Tier>, TierRepositoryError>;

    /// Fetch the default tier, if one is flagged.
    async fn find_default(&self) -> Result<Option<Tier>, TierRepositoryError>;

    /// Persist a new tier and return it with its assigned id.
    async fn insert(&self, tier: NewTier) -> Result<Tier, TierRepositoryError>;

    /// Insert `tiers` in order, but only into an empty store.
    ///
    /// Emptiness is re-checked in the same atomic write so two concurrent
    /// seeders cannot both apply.
    async fn insert_many(&self, tiers: Vec<NewTier>) -> Result<SeedingResult, TierRepositoryError>;

    /// Overwrite an existing tier.
    ///
    /// # Errors
    ///
    /// [`TierRepositoryError::Missing`] when no tier has `tier.id`.
    async fn save(&self, tier: &Tier) -> Result<Tier, TierRepositoryError>;

    /// Remove a tier. Returns `false` when it did not exist.
    ///
    /// # Errors
    ///
    /// [`TierRepositoryError::TierInUse`] when users still reference it.
    async fn delete(&self, id: TierId) -> Result<bool, TierRepositoryError>;

    /// Number of stored tiers.
    async fn count(&self) -> Result<u64, TierRepositoryError>;
}
