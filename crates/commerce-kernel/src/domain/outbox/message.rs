// crates/commerce-kernel/src/domain/outbox/message.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;
use crate::domain::events::IntegrationEvent;
use crate::errors::{DomainError, Result};

/// États possibles d'un message outbox. Il n'y a pas d'état "done" :
/// un message traité avec succès est supprimé de la table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxStatus {
    Pending,
    InProgress,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "pending",
            OutboxStatus::InProgress => "in_progress",
        }
    }

    pub fn try_new(raw: &str) -> Result<Self> {
        match raw {
            "pending" => Ok(OutboxStatus::Pending),
            "in_progress" => Ok(OutboxStatus::InProgress),
            other => Err(DomainError::Internal(format!(
                "Unknown outbox status: {other}"
            ))),
        }
    }
}

/// Ligne de la table outbox, telle que vue par le dispatcher.
#[derive(Debug, Clone)]
pub struct OutboxMessage {
    pub id: Uuid,
    pub status: OutboxStatus,
    pub leased_at: Option<DateTime<Utc>>,
    pub next_available_at: Option<DateTime<Utc>>,
    pub attempts: u32,
    pub event: Value,
}

impl OutboxMessage {
    /// Message fraîchement inséré par le côté commande (pending, attempts = 0).
    pub fn new_pending(id: Uuid, event: Value) -> Self {
        Self {
            id,
            status: OutboxStatus::Pending,
            leased_at: None,
            next_available_at: None,
            attempts: 0,
            event,
        }
    }

    pub fn decode_event(&self) -> IntegrationEvent {
        IntegrationEvent::from_value(&self.event)
    }
}
