//! Driving port for reading tiers.

use async_trait::async_trait;

use crate::domain::{Error, Tier, TierId};

/// Read-side tier operations consumed by inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TiersQuery: Send + Sync {
    /// All tiers ordered by `(sort_order, id)`.
    async fn list_tiers(&self) -> Result<Vec<Tier>, Error>;

    /// A single tier.
    ///
    /// # Errors
    ///
    /// [`crate::domain::ErrorCode::NotFound`] when the id is unknown.
    async fn get_tier(&self, id: TierId) -> Result<Tier, Error>;

    /// The default tier. Absence is `Ok(None)`, never an error.
    async fn get_default_tier(&self) -> Result<Option<Tier>, Error>;
}
