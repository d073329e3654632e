//! Tests for the tier entitlement service.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::rstest;

use super::tier_service::TierService;
use crate::domain::ports::{
    MockTierRepository, MockUserDirectory, PropertyEntitlementQuery, TierRepositoryError,
    TiersCommand, TiersQuery, UserDirectoryError,
};
use crate::domain::{
    ErrorCode, NewTier, Price, PropertyId, PropertyOwnership, PropertyQuota, Tier, TierChanges,
    TierId, TierName, UserAccount, UserId, UserRelation, UserUpdate,
};

type Service = TierService<MockTierRepository, MockUserDirectory>;

fn make_service(tiers: MockTierRepository, users: MockUserDirectory) -> Service {
    TierService::new(Arc::new(tiers), Arc::new(users))
}

fn tier(id: i64, max_properties: u32, is_default: bool) -> Tier {
    NewTier::new(
        TierName::new(format!("Tier {id}")).expect("valid name"),
        Price::from_minor_units(100),
        PropertyQuota::new(max_properties),
    )
    .with_default(is_default)
    .into_tier(TierId::new(id))
}

fn user_with_tier(id: i64, tier: Option<Tier>) -> UserAccount {
    UserAccount {
        tier_id: tier.as_ref().map(|t| t.id),
        tier,
        ..UserAccount::new(UserId::new(id))
    }
}

fn user_owning(id: i64, count: i64) -> UserAccount {
    UserAccount {
        ownerships: (0..count)
            .map(|n| PropertyOwnership {
                property_id: PropertyId::new(n),
            })
            .collect(),
        ..UserAccount::new(UserId::new(id))
    }
}

#[tokio::test]
async fn get_tier_reports_missing_tier_as_not_found() {
    let mut tiers = MockTierRepository::new();
    tiers
        .expect_find_by_id()
        .with(eq(TierId::new(9)))
        .times(1)
        .return_once(|_| Ok(None));

    let service = make_service(tiers, MockUserDirectory::new());
    let error = service.get_tier(TierId::new(9)).await.expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn get_default_tier_treats_absence_as_none() {
    let mut tiers = MockTierRepository::new();
    tiers.expect_find_default().times(1).return_once(|| Ok(None));

    let service = make_service(tiers, MockUserDirectory::new());
    let default = service.get_default_tier().await.expect("lookup succeeds");
    assert!(default.is_none());
}

#[rstest]
#[case(TierRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(TierRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn list_tiers_maps_repository_errors(
    #[case] failure: TierRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut tiers = MockTierRepository::new();
    tiers
        .expect_list_ordered()
        .times(1)
        .return_once(move || Err(failure));

    let service = make_service(tiers, MockUserDirectory::new());
    let error = service.list_tiers().await.expect_err("failure surfaces");
    assert_eq!(error.code(), expected);
}

#[tokio::test]
async fn update_applies_changes_before_saving() {
    let mut tiers = MockTierRepository::new();
    tiers
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(Some(tier(2, 5, false))));
    tiers
        .expect_save()
        .withf(|saved| {
            saved.id == TierId::new(2)
                && saved.is_default
                && saved.max_properties == PropertyQuota::new(5)
                && saved.name.as_str() == "Tier 2"
        })
        .times(1)
        .return_once(|saved| Ok(saved.clone()));

    let service = make_service(tiers, MockUserDirectory::new());
    let updated = service
        .update_tier(
            TierId::new(2),
            TierChanges {
                is_default: Some(true),
                ..TierChanges::default()
            },
        )
        .await
        .expect("update succeeds");
    assert!(updated.is_default);
}

#[tokio::test]
async fn update_of_missing_tier_does_not_save() {
    let mut tiers = MockTierRepository::new();
    tiers.expect_find_by_id().times(1).return_once(|_| Ok(None));
    tiers.expect_save().never();

    let service = make_service(tiers, MockUserDirectory::new());
    let error = service
        .update_tier(TierId::new(4), TierChanges::default())
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_refuses_tier_with_assigned_users() {
    let mut tiers = MockTierRepository::new();
    tiers
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(Some(tier(3, 5, false))));
    tiers.expect_delete().never();
    let mut users = MockUserDirectory::new();
    users
        .expect_search()
        .withf(|criteria| criteria.tier_id == Some(TierId::new(3)))
        .times(1)
        .return_once(|_| Ok(vec![user_with_tier(7, Some(tier(3, 5, false)))]));

    let service = make_service(tiers, users);
    let error = service
        .delete_tier(TierId::new(3))
        .await
        .expect_err("tier in use");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "cannot delete a tier with assigned users");
}

#[tokio::test]
async fn delete_removes_unreferenced_tier() {
    let mut tiers = MockTierRepository::new();
    tiers
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(Some(tier(3, 5, false))));
    tiers
        .expect_delete()
        .with(eq(TierId::new(3)))
        .times(1)
        .return_once(|_| Ok(true));
    let mut users = MockUserDirectory::new();
    users.expect_search().times(1).return_once(|_| Ok(Vec::new()));

    let service = make_service(tiers, users);
    service
        .delete_tier(TierId::new(3))
        .await
        .expect("delete succeeds");
}

#[tokio::test]
async fn delete_maps_racing_reference_to_invalid_request() {
    let mut tiers = MockTierRepository::new();
    tiers
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(Some(tier(3, 5, false))));
    tiers
        .expect_delete()
        .times(1)
        .return_once(|_| Err(TierRepositoryError::tier_in_use(3_i64)));
    let mut users = MockUserDirectory::new();
    users.expect_search().times(1).return_once(|_| Ok(Vec::new()));

    let service = make_service(tiers, users);
    let error = service
        .delete_tier(TierId::new(3))
        .await
        .expect_err("reference appeared");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn assign_checks_tier_before_user() {
    let mut tiers = MockTierRepository::new();
    tiers
        .expect_find_by_id()
        .with(eq(TierId::new(3)))
        .times(1)
        .return_once(|_| Ok(None));
    let mut users = MockUserDirectory::new();
    users.expect_find_one().never();
    users.expect_update().never();

    let service = make_service(tiers, users);
    let error = service
        .assign_tier_to_user(UserId::new(7), TierId::new(3))
        .await
        .expect_err("missing tier");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn assign_reports_missing_user() {
    let mut tiers = MockTierRepository::new();
    tiers
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(Some(tier(3, 5, false))));
    let mut users = MockUserDirectory::new();
    users.expect_find_one().times(1).return_once(|_, _| Ok(None));
    users.expect_update().never();

    let service = make_service(tiers, users);
    let error = service
        .assign_tier_to_user(UserId::new(7), TierId::new(3))
        .await
        .expect_err("missing user");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn assign_maps_tier_deleted_before_update_to_not_found() {
    let mut tiers = MockTierRepository::new();
    tiers
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(Some(tier(3, 5, false))));
    let mut users = MockUserDirectory::new();
    users
        .expect_find_one()
        .times(1)
        .return_once(|_, _| Ok(Some(user_with_tier(7, None))));
    users
        .expect_update()
        .times(1)
        .return_once(|_, _| Err(UserDirectoryError::unknown_tier(3_i64)));

    let service = make_service(tiers, users);
    let error = service
        .assign_tier_to_user(UserId::new(7), TierId::new(3))
        .await
        .expect_err("tier vanished");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "tier 3 not found");
}

#[tokio::test]
async fn assign_writes_only_the_tier_reference() {
    let mut tiers = MockTierRepository::new();
    tiers
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(Some(tier(3, 5, false))));
    let mut users = MockUserDirectory::new();
    users
        .expect_find_one()
        .times(1)
        .return_once(|_, _| Ok(Some(user_with_tier(7, None))));
    users
        .expect_update()
        .with(
            eq(UserId::new(7)),
            eq(UserUpdate {
                tier_id: Some(TierId::new(3)),
            }),
        )
        .times(1)
        .return_once(|_, _| Ok(()));

    let service = make_service(tiers, users);
    service
        .assign_tier_to_user(UserId::new(7), TierId::new(3))
        .await
        .expect("assignment succeeds");
}

#[tokio::test]
async fn unlimited_tier_allows_without_counting() {
    let mut users = MockUserDirectory::new();
    users
        .expect_find_one()
        .withf(|_, relations| relations.contains(&UserRelation::Tier))
        .times(1)
        .return_once(|_, _| Ok(Some(user_with_tier(1, Some(tier(4, 0, false))))));

    let service = make_service(MockTierRepository::new(), users);
    assert!(service.can_create_property(UserId::new(1)).await);
}

#[rstest]
#[case(4, true)]
#[case(5, false)]
#[tokio::test]
async fn finite_quota_compares_strictly(#[case] owned: i64, #[case] expected: bool) {
    let mut users = MockUserDirectory::new();
    let mut sequence = mockall::Sequence::new();
    users
        .expect_find_one()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_, _| Ok(Some(user_with_tier(1, Some(tier(2, 5, false))))));
    users
        .expect_find_one()
        .withf(|_, relations| relations.contains(&UserRelation::Ownerships))
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(move |_, _| Ok(Some(user_owning(1, owned))));

    let service = make_service(MockTierRepository::new(), users);
    assert_eq!(service.can_create_property(UserId::new(1)).await, expected);
}

#[tokio::test]
async fn tierless_user_falls_back_to_default_tier() {
    let mut tiers = MockTierRepository::new();
    tiers
        .expect_find_default()
        .times(1)
        .return_once(|| Ok(Some(tier(1, 1, true))));
    let mut users = MockUserDirectory::new();
    let mut sequence = mockall::Sequence::new();
    users
        .expect_find_one()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_, _| Ok(Some(user_with_tier(1, None))));
    users
        .expect_find_one()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_, _| Ok(Some(user_owning(1, 1))));

    let service = make_service(tiers, users);
    assert!(!service.can_create_property(UserId::new(1)).await);
}

#[tokio::test]
async fn no_tier_configuration_fails_open() {
    let mut tiers = MockTierRepository::new();
    tiers.expect_find_default().times(1).return_once(|| Ok(None));
    let mut users = MockUserDirectory::new();
    users
        .expect_find_one()
        .times(1)
        .return_once(|_, _| Ok(Some(user_with_tier(1, None))));

    let service = make_service(tiers, users);
    assert!(service.can_create_property(UserId::new(1)).await);
}

#[tokio::test]
async fn unknown_user_is_refused_under_finite_default() {
    let mut tiers = MockTierRepository::new();
    tiers
        .expect_find_default()
        .times(1)
        .return_once(|| Ok(Some(tier(1, 1, true))));
    let mut users = MockUserDirectory::new();
    users.expect_find_one().times(2).returning(|_, _| Ok(None));

    let service = make_service(tiers, users);
    assert!(!service.can_create_property(UserId::new(99)).await);
}

#[tokio::test]
async fn directory_failure_fails_closed() {
    let mut users = MockUserDirectory::new();
    users
        .expect_find_one()
        .times(1)
        .return_once(|_, _| Err(UserDirectoryError::connection("down")));

    let service = make_service(MockTierRepository::new(), users);
    assert!(!service.can_create_property(UserId::new(1)).await);
}
