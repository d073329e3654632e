//! Subscription tier model.
//!
//! A tier bundles a display name, a price and a property quota. Tiers are
//! listed by `(sort_order, id)` and at most one of them is the default tier
//! applied to users without an explicit assignment.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures raised while constructing tier fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierValidationError {
    /// Name is empty once trimmed.
    #[error("tier name must not be empty")]
    EmptyName,
    /// Price is below zero.
    #[error("tier price must not be negative")]
    NegativePrice,
    /// Quota does not fit the non-negative range.
    #[error("max properties must be a non-negative integer")]
    InvalidQuota,
}

/// Store-assigned tier identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierId(i64);

impl TierId {
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

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display label of a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TierName(String);

impl TierName {
    /// Validate and construct a tier name.
    ///
    /// # Examples
    /// ```
    /// use landlord_backend::domain::TierName;
    ///
    /// assert!(TierName::new("Basic").is_ok());
    /// assert!(TierName::new("   ").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self, TierValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TierValidationError::EmptyName);
        }
        Ok(Self(name))
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for TierName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TierName> for String {
    fn from(value: TierName) -> Self {
        value.0
    }
}

impl TryFrom<String> for TierName {
    type Error = TierValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Non-negative, currency-agnostic tier price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Price of a free tier.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Validate and construct a price.
    pub fn new(amount: Decimal) -> Result<Self, TierValidationError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(TierValidationError::NegativePrice);
        }
        Ok(Self(amount))
    }

    /// Build a price from minor units, e.g. `from_minor_units(499)` is 4.99.
    ///
    /// # Examples
    /// ```
    /// use landlord_backend::domain::Price;
    ///
    /// assert_eq!(Price::from_minor_units(499).amount().to_string(), "4.99");
    /// ```
    #[must_use]
    pub fn from_minor_units(minor_units: u32) -> Self {
        Self(Decimal::new(i64::from(minor_units), 2))
    }

    /// Decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = TierValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum number of properties a user on the tier may own.
///
/// `0` is the sentinel for "unlimited", never "zero allowed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyQuota(u32);

impl PropertyQuota {
    /// The unlimited sentinel.
    pub const UNLIMITED: Self = Self(0);

    /// Wrap a raw quota; `0` means unlimited.
    #[must_use]
    pub const fn new(max_properties: u32) -> Self {
        Self(max_properties)
    }

    /// Raw stored value, `0` for unlimited.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Whether the quota is the unlimited sentinel.
    #[must_use]
    pub const fn is_unlimited(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<i64> for PropertyQuota {
    type Error = TierValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| TierValidationError::InvalidQuota)
    }
}

/// Persisted subscription tier.
///
/// ## Invariants
/// - At most one stored tier has `is_default` set. Adapters uphold this when
///   inserting or saving a default tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    /// Store-assigned identifier.
    pub id: TierId,
    /// Display label.
    pub name: TierName,
    /// Price per billing period.
    pub price: Price,
    /// Property quota, `0` for unlimited.
    pub max_properties: PropertyQuota,
    /// Listing order; ties are broken by `id`.
    pub sort_order: i32,
    /// Whether this is the fallback tier for unassigned users.
    pub is_default: bool,
}

impl Tier {
    /// Copy every field present in `changes` onto the tier.
    ///
    /// Absent fields keep their current value.
    ///
    /// # Examples
    /// ```
    /// use landlord_backend::domain::{Price, PropertyQuota, Tier, TierChanges, TierId, TierName};
    ///
    /// let mut tier = Tier {
    ///     id: TierId::new(1),
    ///     name: TierName::new("Basic").expect("valid name"),
    ///     price: Price::from_minor_units(499),
    ///     max_properties: PropertyQuota::new(5),
    ///     sort_order: 1,
    ///     is_default: false,
    /// };
    /// tier.apply(TierChanges {
    ///     max_properties: Some(PropertyQuota::new(6)),
    ///     ..TierChanges::default()
    /// });
    /// assert_eq!(tier.max_properties.get(), 6);
    /// assert_eq!(tier.name.as_str(), "Basic");
    /// ```
    pub fn apply(&mut self, changes: TierChanges) {
        let TierChanges {
            name,
            price,
            max_properties,
            sort_order,
            is_default,
        } = changes;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(max_properties) = max_properties {
            self.max_properties = max_properties;
        }
        if let Some(sort_order) = sort_order {
            self.sort_order = sort_order;
        }
        if let Some(is_default) = is_default {
            self.is_default = is_default;
        }
    }
}

/// Input for creating a tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTier {
    /// Display label.
    pub name: TierName,
    /// Price per billing period.
    pub price: Price,
    /// Property quota, `0` for unlimited.
    pub max_properties: PropertyQuota,
    /// Listing order, `0` when not supplied.
    pub sort_order: i32,
    /// Whether the new tier becomes the default.
    pub is_default: bool,
}

impl NewTier {
    /// Start a non-default tier with sort order `0`.
    #[must_use]
    pub fn new(name: TierName, price: Price, max_properties: PropertyQuota) -> Self {
        Self {
            name,
            price,
            max_properties,
            sort_order: 0,
            is_default: false,
        }
    }

    /// Set the listing order.
    #[must_use]
    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Mark the tier as default.
    #[must_use]
    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// Attach the identifier assigned by the store.
    #[must_use]
    pub fn into_tier(self, id: TierId) -> Tier {
        Tier {
            id,
            name: self.name,
            price: self.price,
            max_properties: self.max_properties,
            sort_order: self.sort_order,
            is_default: self.is_default,
        }
    }
}

/// Partial update for a tier. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierChanges {
    /// Replacement display label.
    pub name: Option<TierName>,
    /// Replacement price.
    pub price: Option<Price>,
    /// Replacement quota.
    pub max_properties: Option<PropertyQuota>,
    /// Replacement listing order.
    pub sort_order: Option<i32>,
    /// Replacement default flag.
    pub is_default: Option<bool>,
}

impl TierChanges {
    /// Whether the update promotes the tier to default.
    #[must_use]
    pub fn makes_default(&self) -> bool {
        self.is_default == Some(true)
    }
}

/// Sort tiers by `(sort_order, id)` ascending.
pub fn sort_for_listing(tiers: &mut [Tier]) {
    tiers.sort_by_key(|tier| (tier.sort_order, tier.id));
}
