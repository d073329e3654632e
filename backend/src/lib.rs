//! Tier catalogue and property-quota entitlements for the landlord backend.
//!
//! The crate is laid out as a hexagon: `domain` holds the tier model, the
//! quota decision and the services behind the driving ports; `inbound`
//! exposes those ports over HTTP; `outbound` implements the driven ports
//! with Diesel/PostgreSQL or an in-process store.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
pub mod tier_seeding;

pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
