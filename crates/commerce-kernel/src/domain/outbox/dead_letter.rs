// crates/commerce-kernel/src/domain/outbox/dead_letter.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Ligne de la table outbox_dead_letter : destination terminale d'un message
/// dont le budget de retry est épuisé. `id` reprend l'id du message outbox.
#[derive(Debug, Clone)]
pub struct DeadLetterMessage {
    pub id: Uuid,
    pub failed_at: DateTime<Utc>,
    pub event: Value,
    pub last_error: String,
}
