//! Property quota decisions.
//!
//! The decision is pure: callers resolve the applicable tier and the owned
//! property count, and this module answers whether one more property fits.

use super::{PropertyQuota, Tier};

/// Where the applicable quota came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaBasis<'a> {
    /// The tier assigned to the user.
    Assigned(&'a Tier),
    /// The default tier, used when the user has none or was not found.
    Default(&'a Tier),
    /// No tier applies and no default exists.
    Unconfigured,
}

impl<'a> QuotaBasis<'a> {
    /// Pick the assigned tier, falling back to the default tier.
    #[must_use]
    pub fn resolve(assigned: Option<&'a Tier>, default: Option<&'a Tier>) -> Self {
        match (assigned, default) {
            (Some(tier), _) => Self::Assigned(tier),
            (None, Some(tier)) => Self::Default(tier),
            (None, None) => Self::Unconfigured,
        }
    }

    /// Quota of the chosen tier, `None` when unconfigured.
    #[must_use]
    pub fn quota(self) -> Option<PropertyQuota> {
        match self {
            Self::Assigned(tier) | Self::Default(tier) => Some(tier.max_properties),
            Self::Unconfigured => None,
        }
    }
}

/// Whether a user owning `owned` properties may create another one.
///
/// An unlimited quota always permits. Otherwise the comparison is strict, so
/// a user at the limit is refused.
///
/// # Examples
/// ```
/// use landlord_backend::domain::{PropertyQuota, quota::permits_another};
///
/// assert!(permits_another(PropertyQuota::new(5), 4));
/// assert!(!permits_another(PropertyQuota::new(5), 5));
/// assert!(permits_another(PropertyQuota::UNLIMITED, 1_000));
/// ```
#[must_use]
pub fn permits_another(quota: PropertyQuota, owned: usize) -> bool {
    if quota.is_unlimited() {
        return true;
    }
    // Counts beyond u32 are over any finite quota.
    u32::try_from(owned).is_ok_and(|owned| owned < quota.get())
}
