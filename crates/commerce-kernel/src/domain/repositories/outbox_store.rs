// crates/commerce-kernel/src/domain/repositories/outbox_store.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;
use crate::domain::outbox::OutboxMessage;
use crate::domain::transaction::Transaction;
use crate::errors::Result;

/// Durée au-delà de laquelle un lease est considéré comme abandonné
/// (worker crashé) et la ligne redevient éligible.
pub const STALE_LEASE_SECONDS: i64 = 5 * 60;

pub fn stale_lease() -> chrono::Duration {
    chrono::Duration::seconds(STALE_LEASE_SECONDS)
}

/// Primitives de persistance de la table outbox et de sa dead-letter.
///
/// Les opérations qui prennent un `tx` participent à la transaction de
/// l'appelant ; les autres s'exécutent sur une connexion du pool.
#[async_trait]
pub trait OutboxStore: Send + Sync {
    /// Sélectionne jusqu'à `limit` ids éligibles, ordonnés par id croissant :
    /// soit `pending` et disponibles (`next_available_at` nul ou passé),
    /// soit `in_progress` avec un lease périmé. Les lignes retournées sont
    /// verrouillées jusqu'à la fin de la transaction ; deux workers ne
    /// peuvent jamais obtenir le même id simultanément.
    async fn select_eligible_for_update(
        &self,
        tx: &mut dyn Transaction,
        limit: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>>;

    /// Passe les lignes en `in_progress` avec un lease frais.
    async fn mark_in_progress(
        &self,
        tx: &mut dyn Transaction,
        ids: &[Uuid],
        leased_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Lit la ligne complète, ou None si elle a disparu (course avec un pair).
    async fn fetch(&self, id: Uuid) -> Result<Option<OutboxMessage>>;

    /// Relit `attempts` sous verrou exclusif. None si la ligne a disparu :
    /// un autre worker a déjà réglé le sort du message.
    async fn fetch_attempts_for_update(
        &self,
        tx: &mut dyn Transaction,
        id: Uuid,
    ) -> Result<Option<u32>>;

    /// Replanifie le message : `pending`, lease relâché, compteur et
    /// prochaine disponibilité mis à jour.
    async fn schedule_retry(
        &self,
        tx: &mut dyn Transaction,
        id: Uuid,
        attempts: u32,
        next_available_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Supprime la ligne (seule issue d'un traitement réussi).
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Supprime la ligne outbox et insère la dead-letter sous le même id,
    /// dans la transaction fournie. L'insert est idempotent sur l'id :
    /// un doublon est silencieusement absorbé.
    async fn transfer_to_dlq(
        &self,
        tx: &mut dyn Transaction,
        id: Uuid,
        event: &Value,
        failed_at: DateTime<Utc>,
        last_error: &str,
    ) -> Result<()>;
}
