//! Plan limits on stores and users.

mod common;

use std::time::Duration;

use common::*;
use stockbook_core::quota::NO_SUBSCRIPTION_REASON;
use stockbook_core::{
    CoreError, ErrorKind, NewPlan, NewStore, NewUser, QuotaResource, SubscriptionStatus, UserRole,
};
use stockbook_db::{Database, LedgerError};

fn new_store(owner_id: &str, name: &str) -> NewStore {
    NewStore {
        owner_id: owner_id.to_string(),
        name: name.to_string(),
        address: None,
    }
}

fn new_user(store_id: &str, email: &str) -> NewUser {
    NewUser {
        store_id: store_id.to_string(),
        name: "Staff".to_string(),
        email: email.to_string(),
        role: UserRole::Cashier,
    }
}

async fn plan(db: &Database, name: &str, max_stores: i64, max_users: i64) -> String {
    db.subscriptions()
        .create_plan(&NewPlan {
            name: name.to_string(),
            max_stores,
            max_users,
            price: money("10.00"),
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_owner_without_subscription_is_denied() {
    let db = memory_db().await;

    let decision = db.quota().can_create_store("owner-x").await.unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.current_count, 0);
    assert_eq!(decision.max_allowed, 0);
    assert_eq!(decision.reason.as_deref(), Some(NO_SUBSCRIPTION_REASON));

    let err = db.quota().create_store(&new_store("owner-x", "Kiosk")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
    assert_eq!(count(&db, "stores").await, 0);
}

#[tokio::test]
async fn test_store_limit_is_reported_and_enforced() {
    let db = memory_db().await;
    subscribe(&db, OWNER, "Duo", 2, 5).await;

    let before = db.quota().can_create_store(OWNER).await.unwrap();
    assert!(before.allowed);
    assert_eq!(before.current_count, 0);
    assert_eq!(before.max_allowed, 2);
    assert_eq!(before.reason, None);

    open_store(&db, OWNER, "North").await;
    open_store(&db, OWNER, "South").await;

    let full = db.quota().can_create_store(OWNER).await.unwrap();
    assert!(!full.allowed);
    assert_eq!(full.current_count, 2);
    assert_eq!(full.max_allowed, 2);
    assert!(full.reason.is_some());

    let err = db.quota().create_store(&new_store(OWNER, "East")).await.unwrap_err();
    match err {
        LedgerError::Core(CoreError::QuotaExceeded {
            resource,
            current_count,
            max_allowed,
            ..
        }) => {
            assert_eq!(resource, QuotaResource::Store);
            assert_eq!(current_count, 2);
            assert_eq!(max_allowed, 2);
        }
        other => panic!("expected QuotaExceeded, got {other:?}"),
    }
    assert_eq!(count(&db, "stores").await, 2);
}

#[tokio::test]
async fn test_deactivated_store_frees_a_slot() {
    let db = memory_db().await;
    subscribe(&db, OWNER, "Solo", 1, 5).await;
    let first = open_store(&db, OWNER, "First").await;

    assert!(!db.quota().can_create_store(OWNER).await.unwrap().allowed);

    db.tenancy().deactivate_store(&first.id).await.unwrap();

    let decision = db.quota().can_create_store(OWNER).await.unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.current_count, 0);
    open_store(&db, OWNER, "Second").await;
}

#[tokio::test]
async fn test_users_are_counted_across_the_owners_stores() {
    let db = memory_db().await;
    subscribe(&db, OWNER, "Team", 2, 3).await;
    let north = open_store(&db, OWNER, "North").await;
    let south = open_store(&db, OWNER, "South").await;
    let quota = db.quota();

    quota.create_user(&new_user(&north.id, "a@example.com")).await.unwrap();
    quota.create_user(&new_user(&north.id, "b@example.com")).await.unwrap();
    quota.create_user(&new_user(&south.id, "c@example.com")).await.unwrap();

    let decision = quota.can_create_user(OWNER).await.unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.current_count, 3);
    assert_eq!(decision.max_allowed, 3);

    let err = quota.create_user(&new_user(&south.id, "d@example.com")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
    assert_eq!(count(&db, "users").await, 3);
    assert_eq!(db.tenancy().list_users(&south.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_user_creation_checks_store_and_email() {
    let db = memory_db().await;
    let store = store_fixture(&db).await;
    let quota = db.quota();

    quota.create_user(&new_user(&store.id, "dup@example.com")).await.unwrap();

    let duplicate = quota.create_user(&new_user(&store.id, "dup@example.com")).await.unwrap_err();
    assert_eq!(duplicate.kind(), ErrorKind::InvalidRequest);

    let missing = quota.create_user(&new_user("no-such-store", "x@example.com")).await.unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    db.tenancy().deactivate_store(&store.id).await.unwrap();
    let closed = quota.create_user(&new_user(&store.id, "y@example.com")).await.unwrap_err();
    assert_eq!(closed.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_subscription_status_controls_quota() {
    let db = memory_db().await;
    let basic = plan(&db, "Basic", 1, 2).await;
    let subscriptions = db.subscriptions();

    let pending = subscriptions
        .subscribe(OWNER, &basic, SubscriptionStatus::Pending, None)
        .await
        .unwrap();
    assert!(db.quota().can_create_store(OWNER).await.unwrap().allowed);

    subscriptions
        .set_status(&pending.id, SubscriptionStatus::Cancelled)
        .await
        .unwrap();
    let decision = db.quota().can_create_store(OWNER).await.unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.max_allowed, 0);
    assert_eq!(subscriptions.current_for_owner(OWNER).await.unwrap(), None);
}

#[tokio::test]
async fn test_newest_subscription_supplies_limits() {
    let db = memory_db().await;
    let basic = plan(&db, "Basic", 1, 2).await;
    let pro = plan(&db, "Pro", 5, 20).await;
    let subscriptions = db.subscriptions();

    subscriptions
        .subscribe(OWNER, &basic, SubscriptionStatus::Active, None)
        .await
        .unwrap();
    let upgrade = subscriptions
        .subscribe(OWNER, &pro, SubscriptionStatus::Active, None)
        .await
        .unwrap();

    let decision = db.quota().can_create_store(OWNER).await.unwrap();
    assert_eq!(decision.max_allowed, 5);
    assert_eq!(
        subscriptions.current_for_owner(OWNER).await.unwrap().map(|s| s.id),
        Some(upgrade.id)
    );
}

#[tokio::test]
async fn test_retired_plan_cannot_be_subscribed() {
    let db = memory_db().await;
    let legacy = plan(&db, "Legacy", 3, 3).await;
    let subscriptions = db.subscriptions();

    subscriptions
        .subscribe(OWNER, &legacy, SubscriptionStatus::Active, None)
        .await
        .unwrap();
    subscriptions.set_plan_active(&legacy, false).await.unwrap();

    let err = subscriptions
        .subscribe("owner-2", &legacy, SubscriptionStatus::Active, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);

    // Existing subscribers keep their limits.
    assert_eq!(db.quota().can_create_store(OWNER).await.unwrap().max_allowed, 3);

    let missing = subscriptions
        .subscribe(OWNER, "no-such-plan", SubscriptionStatus::Active, None)
        .await
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    let duplicate = db
        .subscriptions()
        .create_plan(&NewPlan {
            name: "Legacy".to_string(),
            max_stores: 1,
            max_users: 1,
            price: money("1.00"),
        })
        .await
        .unwrap_err();
    assert_eq!(duplicate.kind(), ErrorKind::InvalidRequest);
}

#[tokio::test]
async fn test_owners_do_not_share_quota() {
    let db = memory_db().await;
    subscribe(&db, OWNER, "Solo", 1, 1).await;
    subscribe(&db, "owner-2", "Solo Two", 1, 1).await;

    open_store(&db, OWNER, "Mine").await;
    open_store(&db, "owner-2", "Theirs").await;

    assert_eq!(db.tenancy().list_stores(OWNER).await.unwrap().len(), 1);
    assert_eq!(db.tenancy().list_stores("owner-2").await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creations_respect_the_limit() {
    let (db, _dir) = file_db(8, Duration::from_secs(10)).await;
    subscribe(&db, OWNER, "Solo", 1, 1).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let quota = db.quota();
        let input = new_store(OWNER, &format!("Branch {i}"));
        handles.push(tokio::spawn(async move { quota.create_store(&input).await }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert_eq!(err.kind(), ErrorKind::QuotaExceeded, "unexpected error: {err}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(count(&db, "stores").await, 1);
}
