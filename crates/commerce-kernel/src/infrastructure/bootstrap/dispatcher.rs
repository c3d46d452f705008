// crates/commerce-kernel/src/infrastructure/bootstrap/dispatcher.rs

use std::env;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use sqlx::PgPool;
use crate::application::ports::IntegrationEventHandler;
use crate::application::workers::{
    BatchProcessor, DispatcherConfig, LeaseManager, MessageProcessor, OutboxDispatcher,
};
use crate::clock::SystemClock;
use crate::errors::AppResult;
use crate::infrastructure::kafka::KafkaEffectHandler;
use crate::infrastructure::postgres::{
    PostgresConfig, PostgresOutboxStore, PostgresTransactionManager, create_postgres_pool,
};
use crate::infrastructure::retry::RetryPolicy;

/// Monte et fait tourner le dispatcher d'outbox d'un domaine jusqu'à
/// réception d'un signal d'arrêt (SIGINT / SIGTERM).
///
/// Le côté effet externe est le publieur Kafka ; le côté projection est
/// fourni par le service appelant via `make_projection` (il reçoit le pool
/// partagé, typiquement pour y brancher sa garde inbox).
pub async fn run_outbox_dispatcher<F>(
    domain_name: &str,
    default_topic: &str,
    make_projection: F,
) -> AppResult<()>
where
    F: FnOnce(PgPool) -> Arc<dyn IntegrationEventHandler>,
{
    // 1. Initialisation des logs
    tracing_subscriber::fmt::init();
    tracing::info!("📡 Starting Outbox Dispatcher for domain: {}", domain_name);

    // 2. Configuration via Environnement (avec valeurs par défaut)
    let config = DispatcherConfig::from_env()?;
    let brokers = env::var("KAFKA_BROKERS").unwrap_or_else(|_| "localhost:9092".to_string());

    // 3. Montage de l'infrastructure
    let pool = create_postgres_pool(&PostgresConfig::from_env()?).await?;
    let store = Arc::new(PostgresOutboxStore::new(pool.clone()));
    let tx_manager = Arc::new(PostgresTransactionManager::new(pool.clone()));
    let clock = Arc::new(SystemClock);

    let external_effect = Arc::new(KafkaEffectHandler::new(&brokers, default_topic.to_string())?);
    let projection = make_projection(pool);

    // 4. Câblage du dispatcher
    let in_flight = Arc::new(AtomicUsize::new(0));
    let processor = Arc::new(MessageProcessor::new(
        store.clone(),
        tx_manager.clone(),
        projection,
        external_effect,
        RetryPolicy::default(),
        config.max_attempts,
        clock.clone(),
    ));
    let dispatcher = OutboxDispatcher::new(
        LeaseManager::new(store, tx_manager, clock),
        BatchProcessor::new(processor, in_flight.clone()),
        config.clone(),
        in_flight,
    );

    // 5. Préparation du signal d'arrêt (Graceful Shutdown)
    // On crée un canal "watch" pour notifier le dispatcher
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    // 6. Gestionnaire de signaux système (Ctrl+C, SIGTERM)
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("🛑 Shutdown signal received, stopping dispatcher...");
        let _ = shutdown_tx.send(true);
    });

    tracing::info!(
        "✅ Dispatcher configured: lease_batch={}, process_batch={}, max_attempts={}, interval={:?}",
        config.lease_batch_size,
        config.process_batch_size,
        config.max_attempts,
        config.poll_interval
    );

    // 7. Exécution
    dispatcher.run(shutdown_rx).await;

    tracing::info!("👋 Outbox dispatcher for {} exited clean", domain_name);
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(err) => {
            tracing::error!("❌ Unable to listen for SIGTERM: {}", err);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigterm.recv() => {},
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Unable to listen for shutdown signal: {}", err);
    }
}
