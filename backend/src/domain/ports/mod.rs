//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod property_entitlement_query;
mod tier_repository;
mod tiers_command;
mod tiers_query;
mod user_directory;

#[cfg(test)]
pub use property_entitlement_query::MockPropertyEntitlementQuery;
pub use property_entitlement_query::PropertyEntitlementQuery;
#[cfg(test)]
pub use tier_repository::MockTierRepository;
pub use tier_repository::{SeedingResult, TierRepository, TierRepositoryError};
#[cfg(test)]
pub use tiers_command::MockTiersCommand;
pub use tiers_command::TiersCommand;
#[cfg(test)]
pub use tiers_query::MockTiersQuery;
pub use tiers_query::TiersQuery;
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{UserDirectory, UserDirectoryError};
