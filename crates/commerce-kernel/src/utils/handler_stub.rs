// crates/commerce-kernel/src/utils/handler_stub.rs

use std::sync::Mutex;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;
use crate::application::ports::IntegrationEventHandler;
use crate::domain::events::IntegrationEvent;
use crate::errors::{DomainError, Result};

/// Handler stub : enregistre chaque événement reçu, et peut être configuré
/// pour échouer systématiquement.
pub struct HandlerStub {
    pub seen: Mutex<Vec<IntegrationEvent>>,
    pub error_to_return: Mutex<Option<DomainError>>,
}

impl Default for HandlerStub {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerStub {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            error_to_return: Mutex::new(None),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            error_to_return: Mutex::new(Some(DomainError::Internal(reason.to_string()))),
        }
    }

    pub fn seen_event_ids(&self) -> Vec<Uuid> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| e.event_id)
            .collect()
    }
}

#[async_trait]
impl IntegrationEventHandler for HandlerStub {
    async fn handle(&self, event: &IntegrationEvent) -> Result<()> {
        self.seen.lock().unwrap().push(event.clone());

        if let Some(err) = self.error_to_return.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(())
    }
}

/// Charge utile JSON d'un événement d'intégration valide, telle qu'insérée
/// par le côté commande.
pub fn integration_event_json(event_id: Uuid, event_name: &str) -> Value {
    serde_json::json!({
        "eventId": event_id,
        "eventName": event_name,
        "occurredAt": Utc::now(),
        "correlationId": Uuid::new_v4(),
        "payload": {}
    })
}
