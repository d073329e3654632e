//! Domain primitives, services and ports.
//!
//! Purpose: model subscription tiers and the property quota they grant, and
//! expose the driving ports inbound adapters call. Nothing here depends on
//! HTTP or persistence frameworks; adapters plug in through [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - Tier, NewTier, TierChanges: tier records and their write inputs.
//! - UserAccount: the directory's view of a user.
//! - TierService: implements the tier driving ports.
//! - TierSeeder: fills an empty store with the baseline tiers.

pub mod error;
pub mod ports;
pub mod quota;
pub mod tier;
pub mod tier_seeding;
pub mod tier_service;
#[cfg(test)]
mod tier_service_tests;
pub mod trace_id;
pub mod user_account;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::tier::{
    NewTier, Price, PropertyQuota, Tier, TierChanges, TierId, TierName, TierValidationError,
    sort_for_listing,
};
pub use self::tier_seeding::{TierSeedOutcome, TierSeeder, TierSeedingError, baseline_tiers};
pub use self::tier_service::TierService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user_account::{
    PropertyId, PropertyOwnership, UserAccount, UserId, UserRelation, UserSearchCriteria,
    UserUpdate,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use landlord_backend::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("tier 3 not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
