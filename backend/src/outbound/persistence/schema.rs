//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Timestamp
//! columns are omitted because no query reads them.

diesel::table! {
    /// Subscription tiers.
    ///
    /// A partial unique index keeps at most one row with `is_default` set.
    tiers (id) {
        id -> Int8,
        name -> Text,
        /// Unscaled NUMERIC, non-negative.
        price -> Numeric,
        /// `0` means unlimited.
        max_properties -> Int8,
        sort_order -> Int4,
        is_default -> Bool,
    }
}

diesel::table! {
    /// User accounts, reduced to the tier reference.
    ///
    /// `tier_id` references `tiers.id` with `ON DELETE RESTRICT`.
    users (id) {
        id -> Int8,
        tier_id -> Nullable<Int8>,
    }
}

diesel::table! {
    /// One row per property held by a user.
    property_ownerships (user_id, property_id) {
        user_id -> Int8,
        property_id -> Int8,
    }
}

diesel::joinable!(users -> tiers (tier_id));
diesel::joinable!(property_ownerships -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(tiers, users, property_ownerships);
