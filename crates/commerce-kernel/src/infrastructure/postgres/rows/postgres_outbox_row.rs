// crates/commerce-kernel/src/infrastructure/postgres/rows/postgres_outbox_row.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use crate::domain::outbox::{OutboxMessage, OutboxStatus};
use crate::errors::DomainError;

/// Struct privé à l'infrastructure pour le mapping SQLx
#[derive(FromRow)]
pub struct OutboxRow {
    id: Uuid,
    status: String,
    leased_at: Option<DateTime<Utc>>,
    next_available_at: Option<DateTime<Utc>>,
    attempts: i32,
    event: Value,
}

impl TryFrom<OutboxRow> for OutboxMessage {
    type Error = DomainError;

    fn try_from(row: OutboxRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            status: OutboxStatus::try_new(&row.status)?,
            leased_at: row.leased_at,
            next_available_at: row.next_available_at,
            attempts: row.attempts.max(0) as u32,
            event: row.event,
        })
    }
}
