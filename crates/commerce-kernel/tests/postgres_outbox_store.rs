// crates/commerce-kernel/tests/postgres_outbox_store.rs
//
// Tests d'intégration du store Postgres (nécessitent Docker) :
// cargo test -p commerce-kernel --features test-utils

#![cfg(all(feature = "postgres", feature = "test-utils"))]

use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use commerce_kernel::application::workers::LeaseManager;
use commerce_kernel::clock::SystemClock;
use commerce_kernel::domain::outbox::OutboxStatus;
use commerce_kernel::domain::repositories::OutboxStore;
use commerce_kernel::domain::transaction::TransactionManager;
use commerce_kernel::infrastructure::postgres::utils::setup_test_postgres;
use commerce_kernel::infrastructure::postgres::{PostgresOutboxStore, PostgresTransactionManager};

async fn seed(
    pool: &PgPool,
    status: &str,
    leased_at: Option<DateTime<Utc>>,
    next_available_at: Option<DateTime<Utc>>,
    attempts: i32,
) -> Uuid {
    let id = Uuid::new_v4();
    let event = serde_json::json!({
        "eventId": id,
        "eventName": "product.created",
        "occurredAt": Utc::now(),
        "correlationId": Uuid::new_v4(),
        "payload": {}
    });

    sqlx::query(
        "INSERT INTO outbox (id, status, leased_at, next_available_at, attempts, event)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(id)
    .bind(status)
    .bind(leased_at)
    .bind(next_available_at)
    .bind(attempts)
    .bind(&event)
    .execute(pool)
    .await
    .unwrap();

    id
}

#[tokio::test]
async fn test_lease_transitions_eligible_rows_only() {
    // Arrange
    let (pool, _container) = setup_test_postgres(&[]).await;
    let store: Arc<dyn OutboxStore> = Arc::new(PostgresOutboxStore::new(pool.clone()));
    let tx_manager = Arc::new(PostgresTransactionManager::new(pool.clone()));
    let manager = LeaseManager::new(store.clone(), tx_manager, Arc::new(SystemClock));

    let eligible = seed(&pool, "pending", None, None, 0).await;
    let scheduled = seed(
        &pool,
        "pending",
        None,
        Some(Utc::now() + Duration::seconds(60)),
        0,
    )
    .await;
    let fresh_lease = seed(&pool, "in_progress", Some(Utc::now()), None, 0).await;
    let stale_lease = seed(
        &pool,
        "in_progress",
        Some(Utc::now() - Duration::minutes(6)),
        None,
        0,
    )
    .await;

    // Act
    let ids = manager.lease(10).await.unwrap();

    // Assert
    assert!(ids.contains(&eligible));
    assert!(ids.contains(&stale_lease), "lease périmé non récupéré");
    assert!(!ids.contains(&scheduled));
    assert!(!ids.contains(&fresh_lease));

    let leased = store.fetch(eligible).await.unwrap().unwrap();
    assert_eq!(leased.status, OutboxStatus::InProgress);
    assert!(leased.leased_at.is_some());
}

#[tokio::test]
async fn test_locked_rows_are_skipped_by_concurrent_selection() {
    // Arrange
    let (pool, _container) = setup_test_postgres(&[]).await;
    let store: Arc<dyn OutboxStore> = Arc::new(PostgresOutboxStore::new(pool.clone()));
    let tx_manager = Arc::new(PostgresTransactionManager::new(pool.clone()));

    let first = seed(&pool, "pending", None, None, 0).await;
    let second = seed(&pool, "pending", None, None, 0).await;

    // Act : une première transaction verrouille tout, une seconde sélectionne
    let mut holding_tx = tx_manager.begin().await.unwrap();
    let held = store
        .select_eligible_for_update(holding_tx.as_mut(), 10, Utc::now())
        .await
        .unwrap();

    let mut concurrent_tx = tx_manager.begin().await.unwrap();
    let seen_while_locked = store
        .select_eligible_for_update(concurrent_tx.as_mut(), 10, Utc::now())
        .await
        .unwrap();
    concurrent_tx.commit().await.unwrap();
    holding_tx.commit().await.unwrap();

    // Assert
    let mut held_sorted = held.clone();
    held_sorted.sort();
    let mut expected = vec![first, second];
    expected.sort();
    assert_eq!(held_sorted, expected);
    assert!(
        seen_while_locked.is_empty(),
        "SKIP LOCKED doit cacher les lignes verrouillées"
    );
}

#[tokio::test]
async fn test_schedule_retry_resets_lease_and_updates_attempts() {
    // Arrange
    let (pool, _container) = setup_test_postgres(&[]).await;
    let store: Arc<dyn OutboxStore> = Arc::new(PostgresOutboxStore::new(pool.clone()));
    let tx_manager = Arc::new(PostgresTransactionManager::new(pool.clone()));

    let id = seed(&pool, "in_progress", Some(Utc::now()), None, 1).await;
    let next_available_at = Utc::now() + Duration::seconds(30);

    // Act
    let mut tx = tx_manager.begin().await.unwrap();
    let attempts = store
        .fetch_attempts_for_update(tx.as_mut(), id)
        .await
        .unwrap()
        .unwrap();
    store
        .schedule_retry(tx.as_mut(), id, attempts + 1, next_available_at)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    // Assert
    let row = store.fetch(id).await.unwrap().unwrap();
    assert_eq!(row.status, OutboxStatus::Pending);
    assert_eq!(row.attempts, 2);
    assert!(row.leased_at.is_none());
    let delta = (row.next_available_at.unwrap() - next_available_at).num_milliseconds();
    assert!(delta.abs() < 10);
}

#[tokio::test]
async fn test_transfer_to_dlq_is_idempotent_on_id() {
    // Arrange
    let (pool, _container) = setup_test_postgres(&[]).await;
    let store: Arc<dyn OutboxStore> = Arc::new(PostgresOutboxStore::new(pool.clone()));
    let tx_manager = Arc::new(PostgresTransactionManager::new(pool.clone()));

    let id = seed(&pool, "in_progress", Some(Utc::now()), None, 4).await;
    let event = store.fetch(id).await.unwrap().unwrap().event;

    // Act : double transfert du même id
    for last_error in ["projection: boom; external effect: None", "second attempt"] {
        let mut tx = tx_manager.begin().await.unwrap();
        store
            .transfer_to_dlq(tx.as_mut(), id, &event, Utc::now(), last_error)
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    // Assert : la ligne outbox a disparu, une seule dead-letter, la première gagne
    assert!(store.fetch(id).await.unwrap().is_none());

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM outbox_dead_letter WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);

    let (last_error,): (String,) =
        sqlx::query_as("SELECT last_error FROM outbox_dead_letter WHERE id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(last_error.contains("boom"));
}
