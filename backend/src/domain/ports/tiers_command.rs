//! Driving port for tier administration.

use async_trait::async_trait;

use crate::domain::{Error, NewTier, Tier, TierChanges, TierId, UserId};

/// Write-side tier operations consumed by inbound adapters.
///
/// Creating or updating a tier with the default flag set demotes every other
/// default tier in the same write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TiersCommand: Send + Sync {
    /// Create a tier and return it with its assigned id.
    async fn create_tier(&self, tier: NewTier) -> Result<Tier, Error>;

    /// Apply the present fields of `changes` to an existing tier.
    ///
    /// # Errors
    ///
    /// `NotFound` when the tier does not exist.
    async fn update_tier(&self, id: TierId, changes: TierChanges) -> Result<Tier, Error>;

    /// Delete a tier that no user references.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the tier does not exist.
    /// - `InvalidRequest` when users are still assigned to it.
    async fn delete_tier(&self, id: TierId) -> Result<(), Error>;

    /// Assign a tier to a user. The tier is resolved before the user.
    ///
    /// # Errors
    ///
    /// `NotFound` when either the tier or the user does not exist.
    async fn assign_tier_to_user(&self, user_id: UserId, tier_id: TierId) -> Result<(), Error>;
}
