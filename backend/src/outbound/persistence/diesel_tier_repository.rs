//! PostgreSQL-backed `TierRepository` implementation using Diesel ORM.
//!
//! Writes that make a tier the default first demote every other default in
//! the same transaction with one conditional `UPDATE`. The partial unique
//! index on `tiers (is_default)` rejects anything that slips past.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{SeedingResult, TierRepository, TierRepositoryError};
use crate::domain::{NewTier, Tier, TierId, TierValidationError};

use super::diesel_error_mapping::{is_foreign_key_violation, map_diesel_error, map_pool_error};
use super::models::{TierRow, TierValues};
use super::pool::{DbPool, PoolError};
use super::schema::tiers;

/// Diesel-backed implementation of the [`TierRepository`] port.
#[derive(Clone)]
pub struct DieselTierRepository {
    pool: DbPool,
}

impl DieselTierRepository {
    /// Create a repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> TierRepositoryError {
    map_pool_error(error, TierRepositoryError::connection)
}

fn map_diesel(error: DieselError) -> TierRepositoryError {
    map_diesel_error(
        error,
        TierRepositoryError::query,
        TierRepositoryError::connection,
    )
}

fn map_invalid(error: TierValidationError) -> TierRepositoryError {
    TierRepositoryError::query(format!("invalid tier data: {error}"))
}

fn row_to_tier(row: TierRow) -> Result<Tier, TierRepositoryError> {
    Tier::try_from(row).map_err(map_invalid)
}

/// Unset `is_default` on every default tier except `except`.
async fn clear_default_flags(
    conn: &mut AsyncPgConnection,
    except: Option<TierId>,
) -> QueryResult<usize> {
    let defaults = tiers::table.filter(tiers::is_default.eq(true));
    match except {
        Some(id) => {
            diesel::update(defaults.filter(tiers::id.ne(id.get())))
                .set(tiers::is_default.eq(false))
                .execute(conn)
                .await
        }
        None => {
            diesel::update(defaults)
                .set(tiers::is_default.eq(false))
                .execute(conn)
                .await
        }
    }
}

async fn insert_row(
    conn: &mut AsyncPgConnection,
    values: &TierValues<'_>,
) -> QueryResult<TierRow> {
    diesel::insert_into(tiers::table)
        .values(values)
        .returning(TierRow::as_returning())
        .get_result(conn)
        .await
}

fn ordered() -> tiers::BoxedQuery<'static, Pg> {
    tiers::table
        .order((tiers::sort_order.asc(), tiers::id.asc()))
        .into_boxed()
}

#[async_trait]
impl TierRepository for DieselTierRepository {
    async fn list_ordered(&self) -> Result<Vec<Tier>, TierRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows: Vec<TierRow> = ordered()
            .select(TierRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;
        rows.into_iter().map(row_to_tier).collect()
    }

    async fn find_by_id(&self, id: TierId) -> Result<Option<Tier>, TierRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: Option<TierRow> = tiers::table
            .find(id.get())
            .select(TierRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        row.map(row_to_tier).transpose()
    }

    async fn find_default(&self) -> Result<Option<Tier>, TierRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: Option<TierRow> = ordered()
            .filter(tiers::is_default.eq(true))
            .select(TierRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        row.map(row_to_tier).transpose()
    }

    async fn insert(&self, tier: NewTier) -> Result<Tier, TierRepositoryError> {
        let values = TierValues::from_new(&tier);
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    if values.is_default {
                        clear_default_flags(conn, None).await?;
                    }
                    insert_row(conn, &values).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel)?;
        row_to_tier(row)
    }

    async fn insert_many(
        &self,
        tiers_to_seed: Vec<NewTier>,
    ) -> Result<SeedingResult, TierRepositoryError> {
        let rows: Vec<TierValues<'_>> = tiers_to_seed.iter().map(TierValues::from_new).collect();
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        conn.transaction::<_, DieselError, _>(|conn| {
            async move {
                // Serialise concurrent seeders so only one sees an empty table.
                diesel::sql_query("LOCK TABLE tiers IN SHARE ROW EXCLUSIVE MODE")
                    .execute(conn)
                    .await?;
                let existing: i64 = tiers::table.count().get_result(conn).await?;
                if existing > 0 {
                    return Ok(SeedingResult::AlreadySeeded);
                }
                for values in &rows {
                    insert_row(conn, values).await?;
                }
                Ok(SeedingResult::Applied)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel)
    }

    async fn save(&self, tier: &Tier) -> Result<Tier, TierRepositoryError> {
        let values = TierValues::from_tier(tier);
        let id = tier.id;
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    if values.is_default {
                        clear_default_flags(conn, Some(id)).await?;
                    }
                    // A missing row surfaces as NotFound and rolls back.
                    diesel::update(tiers::table.find(id.get()))
                        .set(&values)
                        .returning(TierRow::as_returning())
                        .get_result(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| match err {
                DieselError::NotFound => TierRepositoryError::missing(id.get()),
                other => map_diesel(other),
            })?;
        row_to_tier(row)
    }

    async fn delete(&self, id: TierId) -> Result<bool, TierRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let deleted = diesel::delete(tiers::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    TierRepositoryError::tier_in_use(id.get())
                } else {
                    map_diesel(err)
                }
            })?;
        Ok(deleted > 0)
    }

    async fn count(&self) -> Result<u64, TierRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let total: i64 = tiers::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;
        u64::try_from(total).map_err(|_| TierRepositoryError::query("negative tier count"))
    }
}
