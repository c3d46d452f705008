// crates/commerce-kernel/src/application/workers/message_processor.rs

use std::sync::Arc;
use uuid::Uuid;
use crate::application::ports::IntegrationEventHandler;
use crate::clock::Clock;
use crate::domain::outbox::OutboxMessage;
use crate::domain::repositories::OutboxStore;
use crate::domain::transaction::TransactionManager;
use crate::errors::{DomainError, Result};
use crate::infrastructure::retry::RetryPolicy;

/// Sentinelle utilisée dans `last_error` pour le côté qui a réussi.
const NO_ERROR: &str = "None";

/// Pipeline par message : fetch, invocation des deux handlers en parallèle,
/// puis suppression (succès) ou protocole d'échec (retry / dead-letter).
pub struct MessageProcessor {
    store: Arc<dyn OutboxStore>,
    tx_manager: Arc<dyn TransactionManager>,
    projection: Arc<dyn IntegrationEventHandler>,
    external_effect: Arc<dyn IntegrationEventHandler>,
    retry_policy: RetryPolicy,
    max_attempts: u32,
    clock: Arc<dyn Clock>,
}

impl MessageProcessor {
    pub fn new(
        store: Arc<dyn OutboxStore>,
        tx_manager: Arc<dyn TransactionManager>,
        projection: Arc<dyn IntegrationEventHandler>,
        external_effect: Arc<dyn IntegrationEventHandler>,
        retry_policy: RetryPolicy,
        max_attempts: u32,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            tx_manager,
            projection,
            external_effect,
            retry_policy,
            max_attempts,
            clock,
        }
    }

    pub async fn process(&self, id: Uuid) -> Result<()> {
        // 1. La ligne peut avoir disparu (course avec un pair) : no-op
        let Some(message) = self.store.fetch(id).await? else {
            return Ok(());
        };

        // 2. Décodage de l'événement d'intégration. Un JSON bancal est
        // transmis quand même : refuser ou non est l'affaire des handlers.
        let event = message.decode_event();

        // 3. Les deux capacités sont invoquées en parallèle, résultats combinés en ET
        let (projection, effect) = tokio::join!(
            self.projection.handle(&event),
            self.external_effect.handle(&event)
        );

        // 4. Seule issue de succès : les deux côtés ont répondu Ok
        if projection.is_ok() && effect.is_ok() {
            return self.store.delete(message.id).await;
        }

        let last_error = join_errors(projection.err(), effect.err());
        self.handle_failure(&message, last_error).await
    }

    /// Protocole d'échec. La relecture de `attempts` sous verrou est
    /// indispensable : sans elle, la récupération concurrente d'un lease
    /// périmé par un pair produirait un double incrément ou un double
    /// transfert en dead-letter.
    async fn handle_failure(&self, message: &OutboxMessage, last_error: String) -> Result<()> {
        let mut tx = self.tx_manager.begin().await?;

        // 1. Relecture sous verrou ; absent = un pair a déjà réglé le sort du message
        let Some(attempts) = self
            .store
            .fetch_attempts_for_update(tx.as_mut(), message.id)
            .await?
        else {
            tx.commit().await?;
            return Ok(());
        };

        let attempts = attempts + 1;
        let now = self.clock.now();

        if attempts >= self.max_attempts {
            // 2a. Budget épuisé : suppression + dead-letter dans la même transaction
            tracing::warn!(
                "💀 Message {} exhausted its {} attempts, moving to dead letter",
                message.id,
                self.max_attempts
            );
            self.store
                .transfer_to_dlq(tx.as_mut(), message.id, &message.event, now, &last_error)
                .await?;
        } else {
            // 2b. Replanification avec backoff exponentiel
            let next_available_at = now + self.retry_policy.backoff(attempts);
            self.store
                .schedule_retry(tx.as_mut(), message.id, attempts, next_available_at)
                .await?;
        }

        tx.commit().await
    }
}

fn join_errors(projection: Option<DomainError>, effect: Option<DomainError>) -> String {
    let projection = projection
        .map(|e| e.to_string())
        .unwrap_or_else(|| NO_ERROR.to_string());
    let effect = effect
        .map(|e| e.to_string())
        .unwrap_or_else(|| NO_ERROR.to_string());

    format!("projection: {projection}; external effect: {effect}")
}
