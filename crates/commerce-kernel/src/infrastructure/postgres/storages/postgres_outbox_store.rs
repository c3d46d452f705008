// crates/commerce-kernel/src/infrastructure/postgres/storages/postgres_outbox_store.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;
use crate::domain::outbox::OutboxMessage;
use crate::domain::repositories::{OutboxStore, stale_lease};
use crate::domain::transaction::Transaction;
use crate::errors::Result;
use crate::infrastructure::postgres::rows::OutboxRow;
use crate::infrastructure::postgres::{SqlxErrorExt, TransactionExt};

pub struct PostgresOutboxStore {
    pool: PgPool,
}

impl PostgresOutboxStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutboxStore for PostgresOutboxStore {
    async fn select_eligible_for_update(
        &self,
        tx: &mut dyn Transaction,
        limit: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>> {
        let sql = r#"
            SELECT id FROM outbox
            WHERE (status = 'pending' AND (next_available_at IS NULL OR next_available_at < $2))
               OR (status = 'in_progress' AND leased_at < $3)
            ORDER BY id ASC
            LIMIT $1
            FOR UPDATE SKIP LOCKED
        "#;

        let tx = tx.downcast_mut_sqlx()?;
        let ids = sqlx::query_scalar::<_, Uuid>(sql)
            .bind(limit as i64)
            .bind(now)
            .bind(now - stale_lease())
            .fetch_all(&mut **tx)
            .await
            .map_domain_infra("Failed to select eligible outbox messages")?;

        Ok(ids)
    }

    async fn mark_in_progress(
        &self,
        tx: &mut dyn Transaction,
        ids: &[Uuid],
        leased_at: DateTime<Utc>,
    ) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let tx = tx.downcast_mut_sqlx()?;
        sqlx::query("UPDATE outbox SET status = 'in_progress', leased_at = $2 WHERE id = ANY($1)")
            .bind(ids)
            .bind(leased_at)
            .execute(&mut **tx)
            .await
            .map_domain_infra("Failed to mark outbox messages in progress")?;

        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<OutboxMessage>> {
        let sql = r#"
            SELECT id, status, leased_at, next_available_at, attempts, event
            FROM outbox
            WHERE id = $1
        "#;

        let row = sqlx::query_as::<_, OutboxRow>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_domain_infra("Failed to fetch outbox message")?;

        row.map(OutboxMessage::try_from).transpose()
    }

    async fn fetch_attempts_for_update(
        &self,
        tx: &mut dyn Transaction,
        id: Uuid,
    ) -> Result<Option<u32>> {
        let tx = tx.downcast_mut_sqlx()?;
        let attempts = sqlx::query_scalar::<_, i32>(
            "SELECT attempts FROM outbox WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_domain_infra("Failed to re-select outbox message attempts")?;

        Ok(attempts.map(|a| a.max(0) as u32))
    }

    async fn schedule_retry(
        &self,
        tx: &mut dyn Transaction,
        id: Uuid,
        attempts: u32,
        next_available_at: DateTime<Utc>,
    ) -> Result<()> {
        let sql = r#"
            UPDATE outbox
            SET status = 'pending', leased_at = NULL, attempts = $2, next_available_at = $3
            WHERE id = $1
        "#;

        let tx = tx.downcast_mut_sqlx()?;
        sqlx::query(sql)
            .bind(id)
            .bind(attempts as i32)
            .bind(next_available_at)
            .execute(&mut **tx)
            .await
            .map_domain_infra("Failed to schedule outbox retry")?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM outbox WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_domain_infra("Failed to delete outbox message")?;

        Ok(())
    }

    async fn transfer_to_dlq(
        &self,
        tx: &mut dyn Transaction,
        id: Uuid,
        event: &Value,
        failed_at: DateTime<Utc>,
        last_error: &str,
    ) -> Result<()> {
        let tx = tx.downcast_mut_sqlx()?;

        sqlx::query("DELETE FROM outbox WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_domain_infra("Failed to delete outbox message for dead letter transfer")?;

        // Insert idempotent : un pair a pu enterrer le même id pendant une
        // récupération de lease périmé
        sqlx::query(
            r#"
            INSERT INTO outbox_dead_letter (id, failed_at, event, last_error)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(failed_at)
        .bind(event)
        .bind(last_error)
        .execute(&mut **tx)
        .await
        .map_domain_infra("Failed to insert dead letter row")?;

        Ok(())
    }
}
