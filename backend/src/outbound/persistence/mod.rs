//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the tier repository and user directory ports
//! backed by PostgreSQL via `diesel-async` and a `bb8` pool.
//!
//! - Repository implementations only translate between Diesel rows and
//!   domain types. No entitlement rules live here.
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//!   private to this module.
//! - Database errors are mapped to the port error types with stable
//!   messages.
//!
//! # Example
//!
//! ```no_run
//! use landlord_backend::outbound::persistence::{DbPool, DieselTierRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/landlord")).await?;
//! let tiers = DieselTierRepository::new(pool);
//! # let _ = tiers;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_tier_repository;
mod diesel_user_directory;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_tier_repository::DieselTierRepository;
pub use diesel_user_directory::DieselUserDirectory;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DEFAULT_MAX_SIZE, DbPool, PoolConfig, PoolError};
