//! Integration tests for `DieselTierRepository` against embedded PostgreSQL.
//!
//! Each test boots its own cluster and migrated database. Rows the port never
//! writes (users) are seeded through the synchronous `postgres` client, so
//! seeding happens outside `runtime.block_on`.

use std::sync::Arc;

use landlord_backend::domain::ports::{
    SeedingResult, TierRepository, TierRepositoryError, TiersCommand, TiersQuery,
};
use landlord_backend::domain::{
    ErrorCode, NewTier, Price, PropertyQuota, TierId, TierName, TierService, baseline_tiers,
};
use landlord_backend::outbound::persistence::{
    DbPool, DieselTierRepository, DieselUserDirectory, PoolConfig,
};
use pg_embedded_setup_unpriv::TestCluster;
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use tokio::runtime::Runtime;

mod support;

use support::embedded_postgres::{execute_sql, insert_user, provision_database};
use support::handle_cluster_setup_failure;
use support::pg_embed::test_cluster;

struct TestContext {
    runtime: Runtime,
    database_url: String,
    pool: DbPool,
    repository: DieselTierRepository,
    _cluster: TestCluster,
}

impl TestContext {
    fn service(&self) -> TierService<DieselTierRepository, DieselUserDirectory> {
        TierService::new(
            Arc::new(self.repository.clone()),
            Arc::new(DieselUserDirectory::new(self.pool.clone())),
        )
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    let database_url = provision_database(&cluster, &runtime)?;

    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        database_url,
        repository: DieselTierRepository::new(pool.clone()),
        pool,
        _cluster: cluster,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn new_tier(name: &str, max_properties: u32, is_default: bool) -> NewTier {
    NewTier::new(
        TierName::new(name).expect("valid tier name"),
        Price::from_minor_units(100),
        PropertyQuota::new(max_properties),
    )
    .with_default(is_default)
}

async fn default_ids(repository: &DieselTierRepository) -> Vec<TierId> {
    repository
        .list_ordered()
        .await
        .expect("list tiers")
        .into_iter()
        .filter(|tier| tier.is_default)
        .map(|tier| tier.id)
        .collect()
}

#[rstest]
fn inserting_a_default_demotes_the_previous_one(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        return;
    };

    context.runtime.block_on(async {
        let repository = &context.repository;
        let first = repository
            .insert(new_tier("A", 1, true))
            .await
            .expect("insert A");
        let second = repository
            .insert(new_tier("B", 5, true))
            .await
            .expect("insert B");

        assert_eq!(default_ids(repository).await, vec![second.id]);
        let refetched = repository
            .find_by_id(first.id)
            .await
            .expect("lookup A")
            .expect("A exists");
        assert!(!refetched.is_default);
    });
}

#[rstest]
fn saving_a_default_keeps_its_own_flag(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        return;
    };

    context.runtime.block_on(async {
        let repository = &context.repository;
        let first = repository
            .insert(new_tier("A", 1, true))
            .await
            .expect("insert A");
        let mut second = repository
            .insert(new_tier("B", 5, false))
            .await
            .expect("insert B");

        second.is_default = true;
        let saved = repository.save(&second).await.expect("promote B");
        assert!(saved.is_default);
        assert_eq!(default_ids(repository).await, vec![second.id]);

        // Re-saving the current default must not clear it.
        second.max_properties = PropertyQuota::new(7);
        let resaved = repository.save(&second).await.expect("resave B");
        assert!(resaved.is_default);
        assert_eq!(resaved.max_properties, PropertyQuota::new(7));
        assert_eq!(default_ids(repository).await, vec![second.id]);

        let demoted = repository
            .find_by_id(first.id)
            .await
            .expect("lookup A")
            .expect("A exists");
        assert!(!demoted.is_default);
    });
}

#[rstest]
fn saving_an_unknown_tier_is_missing(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        return;
    };

    context.runtime.block_on(async {
        let ghost = new_tier("Ghost", 1, true).into_tier(TierId::new(404));
        let error = context
            .repository
            .save(&ghost)
            .await
            .expect_err("no such tier");
        assert_eq!(error, TierRepositoryError::missing(404_i64));
    });
}

#[rstest]
fn partial_unique_index_rejects_a_second_default(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        return;
    };

    let insert_default = |name: &str| {
        execute_sql(
            &context.database_url,
            &format!(
                "INSERT INTO tiers (name, price, max_properties, is_default) \
                 VALUES ('{name}', 0, 1, TRUE);"
            ),
        )
    };
    insert_default("First").expect("first default is accepted");
    let error = insert_default("Second").expect_err("second default violates the index");
    assert!(error.contains("tiers_single_default_idx"), "{error}");
}

#[rstest]
fn listing_orders_by_sort_order_then_id(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        return;
    };

    context.runtime.block_on(async {
        let repository = &context.repository;
        let late = repository
            .insert(new_tier("Late", 1, false).with_sort_order(2))
            .await
            .expect("insert");
        let early_b = repository
            .insert(new_tier("Early B", 1, false).with_sort_order(1))
            .await
            .expect("insert");
        let early_a = repository
            .insert(new_tier("Early A", 1, false).with_sort_order(1))
            .await
            .expect("insert");

        let ids: Vec<TierId> = repository
            .list_ordered()
            .await
            .expect("list")
            .into_iter()
            .map(|tier| tier.id)
            .collect();
        assert_eq!(ids, vec![early_b.id, early_a.id, late.id]);
    });
}

#[rstest]
fn full_domain_range_round_trips(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        return;
    };

    context.runtime.block_on(async {
        let name = "Portfolio ".repeat(10);
        let tier = NewTier::new(
            TierName::new(name.clone()).expect("valid name"),
            Price::new(Decimal::new(4999, 3)).expect("valid price"),
            PropertyQuota::new(3_000_000_000),
        );

        let stored = context.repository.insert(tier).await.expect("insert");
        let fetched = context
            .repository
            .find_by_id(stored.id)
            .await
            .expect("lookup")
            .expect("stored");

        assert_eq!(fetched.name.as_str(), name);
        assert_eq!(fetched.price.amount().to_string(), "4.999");
        assert_eq!(fetched.max_properties, PropertyQuota::new(3_000_000_000));
    });
}

#[rstest]
fn insert_many_seeds_only_an_empty_table(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        return;
    };

    context.runtime.block_on(async {
        let repository = &context.repository;
        let baseline = baseline_tiers().expect("baseline tiers are valid");

        let first = repository
            .insert_many(baseline.clone())
            .await
            .expect("seed");
        let second = repository.insert_many(baseline).await.expect("reseed");

        assert_eq!(first, SeedingResult::Applied);
        assert_eq!(second, SeedingResult::AlreadySeeded);
        let names: Vec<String> = repository
            .list_ordered()
            .await
            .expect("list")
            .into_iter()
            .map(|tier| tier.name.as_str().to_owned())
            .collect();
        assert_eq!(names, ["Free", "Basic", "Professional", "Enterprise"]);
        assert_eq!(default_ids(repository).await.len(), 1);
    });
}

#[rstest]
fn concurrent_seeders_apply_once(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        return;
    };

    context.runtime.block_on(async {
        let baseline = baseline_tiers().expect("baseline tiers are valid");
        let left = context.repository.clone();
        let right = context.repository.clone();
        let (left_seed, right_seed) = (baseline.clone(), baseline);

        let (a, b) = tokio::join!(
            async move { left.insert_many(left_seed).await },
            async move { right.insert_many(right_seed).await },
        );
        let mut outcomes = vec![a.expect("seed a"), b.expect("seed b")];
        outcomes.sort_by_key(|outcome| *outcome == SeedingResult::Applied);

        assert_eq!(
            outcomes,
            vec![SeedingResult::AlreadySeeded, SeedingResult::Applied]
        );
        assert_eq!(context.repository.count().await.expect("count"), 4);
    });
}

#[rstest]
fn deleting_a_referenced_tier_reports_it_in_use(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        return;
    };

    let (used, unused) = context.runtime.block_on(async {
        let used = context
            .repository
            .insert(new_tier("Used", 1, false))
            .await
            .expect("insert");
        let unused = context
            .repository
            .insert(new_tier("Unused", 1, false))
            .await
            .expect("insert");
        (used.id, unused.id)
    });
    insert_user(&context.database_url, 7, Some(used.get())).expect("seed user");

    context.runtime.block_on(async {
        let repository = &context.repository;
        let error = repository.delete(used).await.expect_err("referenced");
        assert_eq!(error, TierRepositoryError::tier_in_use(used.get()));
        assert!(repository.find_by_id(used).await.expect("lookup").is_some());

        assert!(repository.delete(unused).await.expect("delete"));
        assert!(!repository.delete(unused).await.expect("second delete"));
    });
}

#[rstest]
fn service_keeps_one_default_across_creates(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        return;
    };

    context.runtime.block_on(async {
        let service = context.service();
        let a = service
            .create_tier(new_tier("A", 1, true))
            .await
            .expect("create A");
        let b = service
            .create_tier(new_tier("B", 5, true))
            .await
            .expect("create B");

        let default = service
            .get_default_tier()
            .await
            .expect("lookup default")
            .expect("a default exists");
        assert_eq!(default.id, b.id);
        assert!(!service.get_tier(a.id).await.expect("lookup A").is_default);
    });
}

#[rstest]
fn service_refuses_to_delete_an_assigned_tier(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        return;
    };

    let tier_id = context.runtime.block_on(async {
        context
            .service()
            .create_tier(new_tier("Assigned", 1, false))
            .await
            .expect("create")
            .id
    });
    insert_user(&context.database_url, 11, Some(tier_id.get())).expect("seed user");

    context.runtime.block_on(async {
        let service = context.service();
        let error = service
            .delete_tier(tier_id)
            .await
            .expect_err("tier has users");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert!(service.get_tier(tier_id).await.is_ok());
    });
}
