// crates/commerce-kernel/src/application/workers/batch_processor.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;
use crate::application::workers::MessageProcessor;

/// Découpe un batch leasé en tranches consécutives et traite chaque tranche
/// en parallèle, tranche après tranche. Le lease peut être large, la
/// concurrence réelle reste bornée par la taille de tranche.
pub struct BatchProcessor {
    processor: Arc<MessageProcessor>,
    in_flight: Arc<AtomicUsize>,
}

impl BatchProcessor {
    pub fn new(processor: Arc<MessageProcessor>, in_flight: Arc<AtomicUsize>) -> Self {
        Self {
            processor,
            in_flight,
        }
    }

    pub async fn process_batch(&self, ids: Vec<Uuid>, chunk_size: u32) {
        if chunk_size == 0 {
            // Pathologie de configuration : les lignes restent in_progress et
            // seront reprises comme leases périmés.
            tracing::warn!(
                "⚠️ process_batch_size is 0, leaving {} leased messages unprocessed",
                ids.len()
            );
            return;
        }

        for chunk in ids.chunks(chunk_size as usize) {
            let mut handles = Vec::with_capacity(chunk.len());

            for id in chunk {
                let id = *id;
                let processor = self.processor.clone();
                let guard = InFlightGuard::new(self.in_flight.clone());

                handles.push(tokio::spawn(async move {
                    let _guard = guard;

                    // Les erreurs par message ne remontent jamais plus haut
                    if let Err(e) = processor.process(id).await {
                        tracing::error!("❌ Failed to process message {}: {:?}", id, e);
                    }
                }));
            }

            // Barrière : la tranche doit se vider avant d'attaquer la suivante
            for handle in handles {
                if let Err(e) = handle.await {
                    tracing::error!("❌ Message pipeline aborted: {:?}", e);
                }
            }
        }
    }
}

/// Comptabilité des pipelines en vol. Le décrément passe par Drop : le
/// compteur est rendu même si le pipeline panique en cours de route.
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
