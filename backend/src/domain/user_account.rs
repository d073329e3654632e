//! User accounts as seen by the entitlement subsystem.
//!
//! Users are owned by an external directory. This subsystem reads their tier
//! relation and property ownerships, and writes only the tier assignment.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Tier, TierId};

/// Directory-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a rental property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(i64);

impl PropertyId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

/// One property held by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyOwnership {
    /// Held property.
    pub property_id: PropertyId,
}

/// Relations a directory lookup may eagerly load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRelation {
    /// The assigned tier record.
    Tier,
    /// Property ownership records.
    Ownerships,
}

/// User record returned by the directory.
///
/// `tier` and `ownerships` are populated only when the matching
/// [`UserRelation`] was requested; otherwise they are `None` and empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// User identifier.
    pub id: UserId,
    /// Assigned tier, if any.
    pub tier_id: Option<TierId>,
    /// Loaded tier relation.
    pub tier: Option<Tier>,
    /// Loaded ownership relation.
    pub ownerships: Vec<PropertyOwnership>,
}

impl UserAccount {
    /// A user with no tier and no loaded relations.
    #[must_use]
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            tier_id: None,
            tier: None,
            ownerships: Vec::new(),
        }
    }

    /// Number of loaded ownership records.
    #[must_use]
    pub fn owned_property_count(&self) -> usize {
        self.ownerships.len()
    }
}

/// Filter for directory searches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSearchCriteria {
    /// Match users assigned to this tier.
    pub tier_id: Option<TierId>,
}

impl UserSearchCriteria {
    /// Users referencing `tier_id`.
    #[must_use]
    pub fn assigned_to(tier_id: TierId) -> Self {
        Self {
            tier_id: Some(tier_id),
        }
    }
}

/// Fields the entitlement subsystem may write on a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    /// New tier assignment; `None` leaves it unchanged.
    pub tier_id: Option<TierId>,
}
