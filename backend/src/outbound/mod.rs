//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed tier repository and user directory
//!   using Diesel ORM.
//! - **memory**: in-process adapters used without a database and in tests.
//!
//! Adapters are thin translators between domain types and storage
//! representations. They contain no entitlement rules.

pub mod memory;
pub mod persistence;
