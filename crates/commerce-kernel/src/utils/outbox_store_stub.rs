// crates/commerce-kernel/src/utils/outbox_store_stub.rs

use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;
use crate::domain::outbox::{DeadLetterMessage, OutboxMessage, OutboxStatus};
use crate::domain::repositories::{OutboxStore, stale_lease};
use crate::domain::transaction::{Transaction, TransactionManager};
use crate::errors::{DomainError, Result};

/// État partagé du store en mémoire. `locked` émule les verrous de lignes :
/// les ids verrouillés sont sautés par la sélection d'éligibilité, comme le
/// ferait FOR UPDATE SKIP LOCKED, et relâchés au commit (ou au drop).
#[derive(Default)]
pub struct InMemoryOutboxState {
    pub rows: BTreeMap<Uuid, OutboxMessage>,
    pub dead_letters: BTreeMap<Uuid, DeadLetterMessage>,
    locked: HashSet<Uuid>,
}

/// Implémentation en mémoire du store, pour les tests du dispatcher.
/// Plusieurs workers peuvent partager le même état via `clone()`.
#[derive(Clone)]
pub struct InMemoryOutboxStore {
    state: Arc<Mutex<InMemoryOutboxState>>,
}

impl Default for InMemoryOutboxStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryOutboxStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryOutboxState::default())),
        }
    }

    pub fn transaction_manager(&self) -> InMemoryTransactionManager {
        InMemoryTransactionManager {
            state: self.state.clone(),
        }
    }

    /// Sème une ligne, comme le ferait le côté commande.
    pub fn insert(&self, message: OutboxMessage) {
        self.state
            .lock()
            .unwrap()
            .rows
            .insert(message.id, message);
    }

    pub fn row(&self, id: Uuid) -> Option<OutboxMessage> {
        self.state.lock().unwrap().rows.get(&id).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.state.lock().unwrap().rows.len()
    }

    pub fn dead_letters(&self) -> Vec<DeadLetterMessage> {
        self.state
            .lock()
            .unwrap()
            .dead_letters
            .values()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl OutboxStore for InMemoryOutboxStore {
    async fn select_eligible_for_update(
        &self,
        tx: &mut dyn Transaction,
        limit: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>> {
        let tx = downcast(tx)?;
        let mut state = self.state.lock().unwrap();
        let stale_cutoff = now - stale_lease();

        let mut ids = Vec::new();
        for (id, row) in state.rows.iter() {
            if ids.len() as u32 >= limit {
                break;
            }
            if state.locked.contains(id) {
                continue;
            }

            let eligible = match row.status {
                OutboxStatus::Pending => row.next_available_at.is_none_or(|t| t < now),
                OutboxStatus::InProgress => row.leased_at.is_some_and(|t| t < stale_cutoff),
            };
            if eligible {
                ids.push(*id);
            }
        }

        for id in &ids {
            state.locked.insert(*id);
            tx.held.push(*id);
        }

        Ok(ids)
    }

    async fn mark_in_progress(
        &self,
        _tx: &mut dyn Transaction,
        ids: &[Uuid],
        leased_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for id in ids {
            if let Some(row) = state.rows.get_mut(id) {
                row.status = OutboxStatus::InProgress;
                row.leased_at = Some(leased_at);
            }
        }
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<OutboxMessage>> {
        Ok(self.state.lock().unwrap().rows.get(&id).cloned())
    }

    async fn fetch_attempts_for_update(
        &self,
        _tx: &mut dyn Transaction,
        id: Uuid,
    ) -> Result<Option<u32>> {
        Ok(self.state.lock().unwrap().rows.get(&id).map(|r| r.attempts))
    }

    async fn schedule_retry(
        &self,
        _tx: &mut dyn Transaction,
        id: Uuid,
        attempts: u32,
        next_available_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(row) = state.rows.get_mut(&id) {
            row.status = OutboxStatus::Pending;
            row.leased_at = None;
            row.attempts = attempts;
            row.next_available_at = Some(next_available_at);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.state.lock().unwrap().rows.remove(&id);
        Ok(())
    }

    async fn transfer_to_dlq(
        &self,
        _tx: &mut dyn Transaction,
        id: Uuid,
        event: &Value,
        failed_at: DateTime<Utc>,
        last_error: &str,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.rows.remove(&id);

        // Idempotent sur l'id, comme l'ON CONFLICT DO NOTHING du vrai store
        state.dead_letters.entry(id).or_insert(DeadLetterMessage {
            id,
            failed_at,
            event: event.clone(),
            last_error: last_error.to_string(),
        });

        Ok(())
    }
}

pub struct InMemoryTransactionManager {
    state: Arc<Mutex<InMemoryOutboxState>>,
}

#[async_trait]
impl TransactionManager for InMemoryTransactionManager {
    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        Ok(Box::new(InMemoryTransaction {
            state: self.state.clone(),
            held: Vec::new(),
        }))
    }
}

pub struct InMemoryTransaction {
    state: Arc<Mutex<InMemoryOutboxState>>,
    held: Vec<Uuid>,
}

impl InMemoryTransaction {
    fn release(&mut self) {
        if self.held.is_empty() {
            return;
        }
        let mut state = self.state.lock().unwrap();
        for id in self.held.drain(..) {
            state.locked.remove(&id);
        }
    }
}

impl Transaction for InMemoryTransaction {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn commit(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.release();
            Ok(())
        })
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        self.release();
    }
}

fn downcast(tx: &mut dyn Transaction) -> Result<&mut InMemoryTransaction> {
    tx.as_any_mut()
        .downcast_mut::<InMemoryTransaction>()
        .ok_or_else(|| DomainError::Internal("Type mismatch: Expected InMemoryTransaction".into()))
}
