// crates/commerce-kernel/src/application/workers/outbox_dispatcher_test.rs

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use chrono::Utc;
    use tokio::sync::watch;
    use tokio::task::JoinHandle;
    use uuid::Uuid;
    use crate::application::workers::{
        BatchProcessor, DispatcherConfig, LeaseManager, MessageProcessor, OutboxDispatcher,
    };
    use crate::clock::SystemClock;
    use crate::domain::outbox::{OutboxMessage, OutboxStatus};
    use crate::infrastructure::retry::RetryPolicy;
    use crate::utils::{HandlerStub, InMemoryOutboxStore, integration_event_json};

    fn build_dispatcher(
        store: &InMemoryOutboxStore,
        projection: Arc<HandlerStub>,
        external_effect: Arc<HandlerStub>,
        config: DispatcherConfig,
    ) -> OutboxDispatcher {
        let clock = Arc::new(SystemClock);
        let in_flight = Arc::new(AtomicUsize::new(0));

        let processor = Arc::new(MessageProcessor::new(
            Arc::new(store.clone()),
            Arc::new(store.transaction_manager()),
            projection,
            external_effect,
            RetryPolicy::default(),
            config.max_attempts,
            clock.clone(),
        ));

        OutboxDispatcher::new(
            LeaseManager::new(
                Arc::new(store.clone()),
                Arc::new(store.transaction_manager()),
                clock,
            ),
            BatchProcessor::new(processor, in_flight.clone()),
            config,
            in_flight,
        )
    }

    fn spawn_dispatcher(
        dispatcher: OutboxDispatcher,
    ) -> (watch::Sender<bool>, JoinHandle<()>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move { dispatcher.run(shutdown_rx).await });
        (shutdown_tx, handle)
    }

    async fn stop(shutdown_tx: watch::Sender<bool>, handle: JoinHandle<()>) {
        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("dispatcher did not stop in time")
            .unwrap();
    }

    fn pending_message() -> OutboxMessage {
        let id = Uuid::new_v4();
        OutboxMessage::new_pending(id, integration_event_json(id, "product.created"))
    }

    #[tokio::test]
    async fn test_single_message_happy_path() {
        // Arrange
        let store = InMemoryOutboxStore::new();
        let projection = Arc::new(HandlerStub::new());
        let effect = Arc::new(HandlerStub::new());

        let message = pending_message();
        let id = message.id;
        store.insert(message);

        // Act
        let dispatcher = build_dispatcher(
            &store,
            projection.clone(),
            effect.clone(),
            DispatcherConfig::default(),
        );
        let (shutdown_tx, handle) = spawn_dispatcher(dispatcher);
        tokio::time::sleep(Duration::from_millis(300)).await;
        stop(shutdown_tx, handle).await;

        // Assert
        assert_eq!(store.row_count(), 0);
        assert_eq!(projection.seen_event_ids(), vec![id]);
        assert_eq!(effect.seen_event_ids(), vec![id]);
    }

    #[tokio::test]
    async fn test_stale_lease_is_recovered_and_processed() {
        // Arrange : une ligne abandonnée in_progress depuis 6 minutes
        let store = InMemoryOutboxStore::new();
        let projection = Arc::new(HandlerStub::new());
        let effect = Arc::new(HandlerStub::new());

        let mut message = pending_message();
        message.status = OutboxStatus::InProgress;
        message.leased_at = Some(Utc::now() - chrono::Duration::minutes(6));
        let id = message.id;
        store.insert(message);

        // Act
        let dispatcher = build_dispatcher(
            &store,
            projection.clone(),
            effect.clone(),
            DispatcherConfig::default(),
        );
        let (shutdown_tx, handle) = spawn_dispatcher(dispatcher);
        tokio::time::sleep(Duration::from_millis(300)).await;
        stop(shutdown_tx, handle).await;

        // Assert
        assert_eq!(store.row_count(), 0);
        assert_eq!(projection.seen_event_ids(), vec![id]);
        assert_eq!(effect.seen_event_ids(), vec![id]);
    }

    #[tokio::test]
    async fn test_future_scheduled_message_is_left_alone() {
        // Arrange : une ligne replanifiée à +60s et une ligne ordinaire
        let store = InMemoryOutboxStore::new();
        let projection = Arc::new(HandlerStub::new());
        let effect = Arc::new(HandlerStub::new());

        let mut scheduled = pending_message();
        scheduled.next_available_at = Some(Utc::now() + chrono::Duration::seconds(60));
        let scheduled_id = scheduled.id;
        store.insert(scheduled);

        let ordinary = pending_message();
        let ordinary_id = ordinary.id;
        store.insert(ordinary);

        // Act
        let dispatcher = build_dispatcher(
            &store,
            projection.clone(),
            effect.clone(),
            DispatcherConfig::default(),
        );
        let (shutdown_tx, handle) = spawn_dispatcher(dispatcher);
        tokio::time::sleep(Duration::from_millis(500)).await;
        stop(shutdown_tx, handle).await;

        // Assert : seule la ligne ordinaire est passée
        assert_eq!(projection.seen_event_ids(), vec![ordinary_id]);
        let remaining = store.row(scheduled_id).unwrap();
        assert_eq!(remaining.status, OutboxStatus::Pending);
    }

    #[tokio::test]
    async fn test_failing_handler_keeps_message_with_incremented_attempts() {
        // Arrange
        let store = InMemoryOutboxStore::new();
        let projection = Arc::new(HandlerStub::failing("boom"));
        let effect = Arc::new(HandlerStub::new());

        let message = pending_message();
        let id = message.id;
        store.insert(message);
        let before = Utc::now();

        // Act : un seul cycle suffit, le backoff met la suite hors de portée
        let dispatcher = build_dispatcher(
            &store,
            projection,
            effect,
            DispatcherConfig {
                max_attempts: 5,
                ..DispatcherConfig::default()
            },
        );
        let (shutdown_tx, handle) = spawn_dispatcher(dispatcher);
        tokio::time::sleep(Duration::from_millis(300)).await;
        stop(shutdown_tx, handle).await;

        // Assert
        let row = store.row(id).unwrap();
        assert_eq!(row.attempts, 1);
        assert_eq!(row.status, OutboxStatus::Pending);
        assert!(row.leased_at.is_none());
        assert!(row.next_available_at.unwrap() > before + chrono::Duration::seconds(1));
    }

    #[tokio::test]
    async fn test_two_workers_deliver_each_message_exactly_once() {
        // Arrange : deux dispatchers sur le même état, handlers partagés
        let store = InMemoryOutboxStore::new();
        let projection = Arc::new(HandlerStub::new());
        let effect = Arc::new(HandlerStub::new());

        let mut expected: Vec<Uuid> = Vec::new();
        for _ in 0..5 {
            let message = pending_message();
            expected.push(message.id);
            store.insert(message);
        }

        // Act
        let worker_a = build_dispatcher(
            &store,
            projection.clone(),
            effect.clone(),
            DispatcherConfig::default(),
        );
        let worker_b = build_dispatcher(
            &store,
            projection.clone(),
            effect.clone(),
            DispatcherConfig::default(),
        );
        let (shutdown_a, handle_a) = spawn_dispatcher(worker_a);
        let (shutdown_b, handle_b) = spawn_dispatcher(worker_b);
        tokio::time::sleep(Duration::from_millis(500)).await;
        stop(shutdown_a, handle_a).await;
        stop(shutdown_b, handle_b).await;

        // Assert : chaque eventId vu exactement une fois par chaque rôle
        assert_eq!(store.row_count(), 0);
        for seen in [projection.seen_event_ids(), effect.seen_event_ids()] {
            let mut seen = seen;
            seen.sort();
            let mut expected_sorted = expected.clone();
            expected_sorted.sort();
            assert_eq!(seen, expected_sorted);
        }
    }
}
