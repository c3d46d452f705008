// crates/commerce-kernel/src/application/workers/outbox_dispatcher.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::sleep;
use crate::application::workers::{BatchProcessor, DispatcherConfig, LeaseManager};

/// Boucle de polling du dispatcher : lease, traitement, attente du reliquat
/// de la période cible, et arrêt gracieux borné.
pub struct OutboxDispatcher {
    lease_manager: LeaseManager,
    batch_processor: BatchProcessor,
    config: DispatcherConfig,
    in_flight: Arc<AtomicUsize>,
}

impl OutboxDispatcher {
    pub fn new(
        lease_manager: LeaseManager,
        batch_processor: BatchProcessor,
        config: DispatcherConfig,
        in_flight: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            lease_manager,
            batch_processor,
            config,
            in_flight,
        }
    }

    pub async fn run(&self, mut shutdown_signal: watch::Receiver<bool>) {
        tracing::info!("📡 Outbox dispatcher started");

        loop {
            // 1. Vérification immédiate du signal d'arrêt
            if *shutdown_signal.borrow() {
                break;
            }

            let cycle_start = Instant::now();

            // 2. Cycle lease + traitement ; aucune erreur ne casse la boucle
            match self.lease_manager.lease(self.config.lease_batch_size).await {
                Ok(ids) if !ids.is_empty() => {
                    tracing::debug!("Leased {} messages", ids.len());
                    self.batch_processor
                        .process_batch(ids, self.config.process_batch_size)
                        .await;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("❌ Dispatch cycle error: {:?}", e);
                }
            }

            // 3. Attente du reliquat de la période cible, ou du signal d'arrêt
            let remaining = self.config.poll_interval.saturating_sub(cycle_start.elapsed());
            tokio::select! {
                _ = sleep(remaining) => {},
                _ = shutdown_signal.changed() => break,
            }
        }

        self.drain_in_flight().await;
        tracing::info!("📡 Outbox dispatcher stopped gracefully");
    }

    /// Attend la fin des pipelines en vol, borné par `shutdown_timeout`.
    /// Au-delà, les handlers abandonnés laissent leur ligne in_progress ;
    /// elle sera reprise comme lease périmé.
    async fn drain_in_flight(&self) {
        let deadline = Instant::now() + self.config.shutdown_timeout;

        while self.in_flight.load(Ordering::SeqCst) > 0 {
            if Instant::now() >= deadline {
                tracing::warn!(
                    "⚠️ Shutdown timeout reached with {} pipelines still in flight",
                    self.in_flight.load(Ordering::SeqCst)
                );
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
    }
}
