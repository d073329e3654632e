//! PostgreSQL-backed `UserDirectory` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserDirectory, UserDirectoryError};
use crate::domain::{
    PropertyId, PropertyOwnership, Tier, TierId, UserAccount, UserId, UserRelation,
    UserSearchCriteria, UserUpdate,
};

use super::diesel_error_mapping::{is_foreign_key_violation, map_diesel_error, map_pool_error};
use super::models::{TierRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{property_ownerships, tiers, users};

/// Diesel-backed implementation of the [`UserDirectory`] port.
#[derive(Clone)]
pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    /// Create a directory over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> UserDirectoryError {
    map_pool_error(error, UserDirectoryError::connection)
}

fn map_diesel(error: DieselError) -> UserDirectoryError {
    map_diesel_error(error, UserDirectoryError::query, UserDirectoryError::connection)
}

fn row_to_account(row: UserRow) -> UserAccount {
    UserAccount {
        tier_id: row.tier_id.map(TierId::new),
        ..UserAccount::new(UserId::new(row.id))
    }
}

#[async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn find_one(
        &self,
        id: UserId,
        relations: &[UserRelation],
    ) -> Result<Option<UserAccount>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let Some(row) = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?
        else {
            return Ok(None);
        };
        let mut account = row_to_account(row);

        if relations.contains(&UserRelation::Tier)
            && let Some(tier_id) = account.tier_id
        {
            let tier_row: Option<TierRow> = tiers::table
                .find(tier_id.get())
                .select(TierRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel)?;
            account.tier = tier_row
                .map(Tier::try_from)
                .transpose()
                .map_err(|err| UserDirectoryError::query(format!("invalid tier data: {err}")))?;
        }

        if relations.contains(&UserRelation::Ownerships) {
            let property_ids: Vec<i64> = property_ownerships::table
                .filter(property_ownerships::user_id.eq(id.get()))
                .order(property_ownerships::property_id.asc())
                .select(property_ownerships::property_id)
                .load(&mut conn)
                .await
                .map_err(map_diesel)?;
            account.ownerships = property_ids
                .into_iter()
                .map(|property_id| PropertyOwnership {
                    property_id: PropertyId::new(property_id),
                })
                .collect();
        }

        Ok(Some(account))
    }

    async fn search(
        &self,
        criteria: &UserSearchCriteria,
    ) -> Result<Vec<UserAccount>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let mut query = users::table.order(users::id.asc()).into_boxed();
        if let Some(tier_id) = criteria.tier_id {
            query = query.filter(users::tier_id.eq(tier_id.get()));
        }
        let rows: Vec<UserRow> = query
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(rows.into_iter().map(row_to_account).collect())
    }

    async fn update(&self, id: UserId, update: UserUpdate) -> Result<(), UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let affected = match update.tier_id {
            Some(tier_id) => diesel::update(users::table.find(id.get()))
                .set(users::tier_id.eq(Some(tier_id.get())))
                .execute(&mut conn)
                .await
                .map_err(|err| {
                    if is_foreign_key_violation(&err) {
                        UserDirectoryError::unknown_tier(tier_id.get())
                    } else {
                        map_diesel(err)
                    }
                })?,
            None => users::table
                .find(id.get())
                .count()
                .get_result::<i64>(&mut conn)
                .await
                .map_err(map_diesel)
                .map(|found| usize::from(found > 0))?,
        };

        if affected == 0 {
            return Err(UserDirectoryError::missing(id.get()));
        }
        Ok(())
    }
}
