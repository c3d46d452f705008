// crates/commerce-kernel/src/application/workers/lease_manager_test.rs

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use chrono::{Duration, Utc};
    use uuid::Uuid;
    use crate::application::workers::LeaseManager;
    use crate::clock::SystemClock;
    use crate::domain::outbox::{OutboxMessage, OutboxStatus};
    use crate::utils::{InMemoryOutboxStore, integration_event_json};

    fn setup() -> (InMemoryOutboxStore, LeaseManager) {
        let store = InMemoryOutboxStore::new();
        let manager = LeaseManager::new(
            Arc::new(store.clone()),
            Arc::new(store.transaction_manager()),
            Arc::new(SystemClock),
        );
        (store, manager)
    }

    fn pending_message() -> OutboxMessage {
        let id = Uuid::new_v4();
        OutboxMessage::new_pending(id, integration_event_json(id, "product.created"))
    }

    #[tokio::test]
    async fn test_lease_zero_limit_short_circuits() {
        // Arrange
        let (store, manager) = setup();
        store.insert(pending_message());

        // Act
        let ids = manager.lease(0).await.unwrap();

        // Assert
        assert!(ids.is_empty());
        assert_eq!(
            store.row_count(),
            1,
            "la base ne doit pas être touchée quand le leasing est désactivé"
        );
    }

    #[tokio::test]
    async fn test_lease_marks_rows_in_progress_in_id_order() {
        // Arrange
        let (store, manager) = setup();
        for _ in 0..5 {
            store.insert(pending_message());
        }

        // Act
        let ids = manager.lease(3).await.unwrap();

        // Assert
        assert_eq!(ids.len(), 3);
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted, "les ids doivent sortir par ordre croissant");

        for id in &ids {
            let row = store.row(*id).unwrap();
            assert_eq!(row.status, OutboxStatus::InProgress);
            assert!(row.leased_at.is_some());
        }
    }

    #[tokio::test]
    async fn test_lease_respects_future_schedule_and_fresh_leases() {
        // Arrange
        let (store, manager) = setup();
        let now = Utc::now();

        // Replanifié dans le futur : inéligible
        let mut scheduled = pending_message();
        scheduled.next_available_at = Some(now + Duration::seconds(60));
        let scheduled_id = scheduled.id;
        store.insert(scheduled);

        // Lease frais tenu par un autre worker : inéligible
        let mut fresh_lease = pending_message();
        fresh_lease.status = OutboxStatus::InProgress;
        fresh_lease.leased_at = Some(now - Duration::seconds(30));
        let fresh_id = fresh_lease.id;
        store.insert(fresh_lease);

        let ordinary = pending_message();
        let ordinary_id = ordinary.id;
        store.insert(ordinary);

        // Act
        let ids = manager.lease(10).await.unwrap();

        // Assert
        assert_eq!(ids, vec![ordinary_id]);
        assert!(!ids.contains(&scheduled_id));
        assert!(!ids.contains(&fresh_id));
    }

    #[tokio::test]
    async fn test_lease_reclaims_stale_leases() {
        // Arrange : un worker a crashé il y a plus de STALE_LEASE
        let (store, manager) = setup();
        let mut stale = pending_message();
        stale.status = OutboxStatus::InProgress;
        stale.leased_at = Some(Utc::now() - Duration::minutes(6));
        let stale_id = stale.id;
        store.insert(stale);

        // Act
        let ids = manager.lease(10).await.unwrap();

        // Assert : la ligne est reprise avec un lease frais
        assert_eq!(ids, vec![stale_id]);
        let row = store.row(stale_id).unwrap();
        assert!(row.leased_at.unwrap() > Utc::now() - Duration::seconds(5));
    }

    #[tokio::test]
    async fn test_concurrent_leases_are_disjoint() {
        // Arrange : deux workers sur le même état partagé
        let (store, manager_a) = setup();
        let manager_b = LeaseManager::new(
            Arc::new(store.clone()),
            Arc::new(store.transaction_manager()),
            Arc::new(SystemClock),
        );
        for _ in 0..20 {
            store.insert(pending_message());
        }

        // Act : les deux leases tournent en parallèle
        let (ids_a, ids_b) = tokio::join!(manager_a.lease(15), manager_b.lease(15));
        let ids_a = ids_a.unwrap();
        let ids_b = ids_b.unwrap();

        // Assert : aucun id ne sort des deux côtés à la fois
        for id in &ids_a {
            assert!(!ids_b.contains(id), "id {} leasé par les deux workers", id);
        }
        assert_eq!(ids_a.len() + ids_b.len(), 20);
    }
}
