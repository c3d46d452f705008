// crates/commerce-kernel/src/application/workers/lease_manager.rs

use std::sync::Arc;
use uuid::Uuid;
use crate::clock::Clock;
use crate::domain::repositories::OutboxStore;
use crate::domain::transaction::TransactionManager;
use crate::errors::Result;

/// Réserve des lots de messages éligibles pour un worker. Les verrous de
/// lignes plus la transition de statut garantissent que deux appels
/// concurrents (même depuis des process distincts) retournent des ensembles
/// disjoints.
pub struct LeaseManager {
    store: Arc<dyn OutboxStore>,
    tx_manager: Arc<dyn TransactionManager>,
    clock: Arc<dyn Clock>,
}

impl LeaseManager {
    pub fn new(
        store: Arc<dyn OutboxStore>,
        tx_manager: Arc<dyn TransactionManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            tx_manager,
            clock,
        }
    }

    /// Retourne les ids leasés, par id croissant. Toute erreur DB remonte à
    /// l'appelant après rollback implicite ; le cycle suivant retentera.
    pub async fn lease(&self, limit: u32) -> Result<Vec<Uuid>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let now = self.clock.now();
        let mut tx = self.tx_manager.begin().await?;

        // 1. Sélection sous verrou des lignes éligibles
        let ids = self
            .store
            .select_eligible_for_update(tx.as_mut(), limit, now)
            .await?;

        if ids.is_empty() {
            tx.commit().await?;
            return Ok(ids);
        }

        // 2. Transition en in_progress avec un lease frais
        self.store.mark_in_progress(tx.as_mut(), &ids, now).await?;
        tx.commit().await?;

        Ok(ids)
    }
}
