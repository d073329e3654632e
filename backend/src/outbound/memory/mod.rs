//! In-process adapters for the tier and user ports.
//!
//! Used when no database is configured and by integration tests. Both
//! adapters share one [`InMemoryStore`] so user assignments and tier deletes
//! observe each other the way a foreign key would.

mod store;
mod tier_repository;
mod user_directory;

pub use store::{InMemoryStore, StorePoisoned};
pub use tier_repository::InMemoryTierRepository;
pub use user_directory::InMemoryUserDirectory;
