//! Tier entitlement service.
//!
//! Implements the tier driving ports on top of the tier repository and the
//! user directory. Lookups that gate a write are awaited in sequence so a
//! missing tier is reported before the user is touched.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    PropertyEntitlementQuery, TierRepository, TierRepositoryError, TiersCommand, TiersQuery,
    UserDirectory, UserDirectoryError,
};
use crate::domain::quota::{QuotaBasis, permits_another};
use crate::domain::{
    Error, NewTier, Tier, TierChanges, TierId, UserId, UserRelation, UserSearchCriteria,
    UserUpdate,
};

/// Service implementing [`TiersQuery`], [`TiersCommand`] and
/// [`PropertyEntitlementQuery`].
#[derive(Clone)]
pub struct TierService<T, U> {
    tiers: Arc<T>,
    users: Arc<U>,
}

impl<T, U> TierService<T, U> {
    /// Create a service over the given adapters.
    pub fn new(tiers: Arc<T>, users: Arc<U>) -> Self {
        Self { tiers, users }
    }
}

impl<T, U> TierService<T, U>
where
    T: TierRepository,
    U: UserDirectory,
{
    fn map_tier_error(error: TierRepositoryError) -> Error {
        match error {
            TierRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("tier repository unavailable: {message}"))
            }
            TierRepositoryError::Query { message } => {
                Error::internal(format!("tier repository error: {message}"))
            }
            TierRepositoryError::Missing { tier_id } => Self::tier_not_found(tier_id),
            TierRepositoryError::TierInUse { tier_id } => Self::tier_in_use(tier_id),
        }
    }

    fn map_user_error(error: UserDirectoryError) -> Error {
        match error {
            UserDirectoryError::Connection { message } => {
                Error::service_unavailable(format!("user directory unavailable: {message}"))
            }
            UserDirectoryError::Query { message } => {
                Error::internal(format!("user directory error: {message}"))
            }
            UserDirectoryError::Missing { user_id } => Self::user_not_found(user_id),
            UserDirectoryError::UnknownTier { tier_id } => Self::tier_not_found(tier_id),
        }
    }

    fn tier_not_found(tier_id: i64) -> Error {
        Error::not_found(format!("tier {tier_id} not found"))
            .with_details(json!({ "tierId": tier_id }))
    }

    fn user_not_found(user_id: i64) -> Error {
        Error::not_found(format!("user {user_id} not found"))
            .with_details(json!({ "userId": user_id }))
    }

    fn tier_in_use(tier_id: i64) -> Error {
        Error::invalid_request("cannot delete a tier with assigned users")
            .with_details(json!({ "tierId": tier_id, "code": "tier_in_use" }))
    }

    async fn require_tier(&self, id: TierId) -> Result<Tier, Error> {
        self.tiers
            .find_by_id(id)
            .await
            .map_err(Self::map_tier_error)?
            .ok_or_else(|| Self::tier_not_found(id.get()))
    }

    /// Resolve the quota basis and decide. Adapter failures surface as `Err`
    /// so the port method can log them once.
    async fn evaluate_property_quota(&self, user_id: UserId) -> Result<bool, String> {
        let user = self
            .users
            .find_one(user_id, &[UserRelation::Tier])
            .await
            .map_err(|err| err.to_string())?;
        let assigned = user.and_then(|account| account.tier);

        let default = match assigned {
            Some(_) => None,
            None => self
                .tiers
                .find_default()
                .await
                .map_err(|err| err.to_string())?,
        };

        let basis = QuotaBasis::resolve(assigned.as_ref(), default.as_ref());
        let Some(quota) = basis.quota() else {
            debug!(user_id = %user_id, "no tier configured; property creation allowed");
            return Ok(true);
        };
        if quota.is_unlimited() {
            return Ok(true);
        }

        let Some(owner) = self
            .users
            .find_one(user_id, &[UserRelation::Ownerships])
            .await
            .map_err(|err| err.to_string())?
        else {
            debug!(user_id = %user_id, "user not found; property creation refused");
            return Ok(false);
        };

        let owned = owner.owned_property_count();
        let allowed = permits_another(quota, owned);
        debug!(
            user_id = %user_id,
            owned,
            max_properties = quota.get(),
            allowed,
            "evaluated property quota"
        );
        Ok(allowed)
    }
}

#[async_trait]
impl<T, U> TiersQuery for TierService<T, U>
where
    T: TierRepository,
    U: UserDirectory,
{
    async fn list_tiers(&self) -> Result<Vec<Tier>, Error> {
        self.tiers
            .list_ordered()
            .await
            .map_err(Self::map_tier_error)
    }

    async fn get_tier(&self, id: TierId) -> Result<Tier, Error> {
        self.require_tier(id).await
    }

    async fn get_default_tier(&self) -> Result<Option<Tier>, Error> {
        self.tiers
            .find_default()
            .await
            .map_err(Self::map_tier_error)
    }
}

#[async_trait]
impl<T, U> TiersCommand for TierService<T, U>
where
    T: TierRepository,
    U: UserDirectory,
{
    async fn create_tier(&self, tier: NewTier) -> Result<Tier, Error> {
        let created = self
            .tiers
            .insert(tier)
            .await
            .map_err(Self::map_tier_error)?;
        info!(tier_id = %created.id, is_default = created.is_default, "tier created");
        Ok(created)
    }

    async fn update_tier(&self, id: TierId, changes: TierChanges) -> Result<Tier, Error> {
        let mut tier = self.require_tier(id).await?;
        tier.apply(changes);
        let saved = self
            .tiers
            .save(&tier)
            .await
            .map_err(Self::map_tier_error)?;
        info!(tier_id = %saved.id, is_default = saved.is_default, "tier updated");
        Ok(saved)
    }

    async fn delete_tier(&self, id: TierId) -> Result<(), Error> {
        self.require_tier(id).await?;
        let assigned = self
            .users
            .search(&UserSearchCriteria::assigned_to(id))
            .await
            .map_err(Self::map_user_error)?;
        if !assigned.is_empty() {
            debug!(tier_id = %id, users = assigned.len(), "refusing to delete assigned tier");
            return Err(Self::tier_in_use(id.get()));
        }

        let deleted = self
            .tiers
            .delete(id)
            .await
            .map_err(Self::map_tier_error)?;
        if !deleted {
            return Err(Self::tier_not_found(id.get()));
        }
        info!(tier_id = %id, "tier deleted");
        Ok(())
    }

    async fn assign_tier_to_user(&self, user_id: UserId, tier_id: TierId) -> Result<(), Error> {
        self.require_tier(tier_id).await?;
        self.users
            .find_one(user_id, &[])
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Self::user_not_found(user_id.get()))?;

        self.users
            .update(
                user_id,
                UserUpdate {
                    tier_id: Some(tier_id),
                },
            )
            .await
            .map_err(Self::map_user_error)?;
        info!(user_id = %user_id, tier_id = %tier_id, "tier assigned to user");
        Ok(())
    }
}

#[async_trait]
impl<T, U> PropertyEntitlementQuery for TierService<T, U>
where
    T: TierRepository,
    U: UserDirectory,
{
    async fn can_create_property(&self, user_id: UserId) -> bool {
        match self.evaluate_property_quota(user_id).await {
            Ok(allowed) => allowed,
            Err(message) => {
                warn!(user_id = %user_id, error = %message, "quota check failed; refusing");
                false
            }
        }
    }
}
