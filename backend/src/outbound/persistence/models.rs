//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::domain::{
    NewTier, Price, PropertyQuota, Tier, TierId, TierName, TierValidationError,
};

use super::schema::{tiers, users};

/// Row struct for reading from the tiers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tiers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TierRow {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub max_properties: i64,
    pub sort_order: i32,
    pub is_default: bool,
}

impl TryFrom<TierRow> for Tier {
    type Error = TierValidationError;

    fn try_from(row: TierRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TierId::new(row.id),
            name: TierName::new(row.name)?,
            price: Price::new(row.price)?,
            max_properties: PropertyQuota::try_from(row.max_properties)?,
            sort_order: row.sort_order,
            is_default: row.is_default,
        })
    }
}

/// Insertable and changeset form of a tier.
///
/// Every domain value fits its column, so building one cannot fail.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tiers)]
pub(crate) struct TierValues<'a> {
    pub name: &'a str,
    pub price: Decimal,
    pub max_properties: i64,
    pub sort_order: i32,
    pub is_default: bool,
}

impl<'a> TierValues<'a> {
    fn build(
        name: &'a TierName,
        price: Price,
        max_properties: PropertyQuota,
        sort_order: i32,
        is_default: bool,
    ) -> Self {
        Self {
            name: name.as_str(),
            price: price.amount(),
            max_properties: i64::from(max_properties.get()),
            sort_order,
            is_default,
        }
    }

    pub(crate) fn from_new(tier: &'a NewTier) -> Self {
        Self::build(
            &tier.name,
            tier.price,
            tier.max_properties,
            tier.sort_order,
            tier.is_default,
        )
    }

    pub(crate) fn from_tier(tier: &'a Tier) -> Self {
        Self::build(
            &tier.name,
            tier.price,
            tier.max_properties,
            tier.sort_order,
            tier.is_default,
        )
    }
}

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub tier_id: Option<i64>,
}
