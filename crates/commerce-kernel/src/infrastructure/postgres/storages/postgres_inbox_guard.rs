// crates/commerce-kernel/src/infrastructure/postgres/storages/postgres_inbox_guard.rs

use std::sync::Arc;
use async_trait::async_trait;
use sqlx::PgPool;
use crate::application::ports::IntegrationEventHandler;
use crate::domain::events::IntegrationEvent;
use crate::errors::Result;
use crate::infrastructure::postgres::SqlxErrorExt;

/// Décorateur d'idempotence côté projection : la table inbox mémorise les
/// `event_id` déjà projetés. Un message re-livré après un succès partiel
/// (projection Ok, effet externe en échec) ne rejoue pas la projection.
pub struct PostgresInboxGuard {
    pool: PgPool,
    inner: Arc<dyn IntegrationEventHandler>,
}

impl PostgresInboxGuard {
    pub fn new(pool: PgPool, inner: Arc<dyn IntegrationEventHandler>) -> Self {
        Self { pool, inner }
    }
}

#[async_trait]
impl IntegrationEventHandler for PostgresInboxGuard {
    async fn handle(&self, event: &IntegrationEvent) -> Result<()> {
        // Sans eventId exploitable, pas de clé de déduplication : on délègue
        // directement, le handler interne tranchera.
        let Some(event_id) = event.event_id else {
            return self.inner.handle(event).await;
        };

        // 1. Déjà projeté ? Le message n'est leasé que par un worker à la
        // fois, la vérification hors transaction suffit.
        let seen: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM inbox WHERE id = $1)")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_domain_infra("Failed to consult inbox")?;

        if seen {
            return Ok(());
        }

        // 2. Projection d'abord, marquage ensuite : un échec du handler doit
        // laisser l'inbox vierge pour que le retry rejoue la projection.
        self.inner.handle(event).await?;

        sqlx::query("INSERT INTO inbox (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(event_id)
            .execute(&self.pool)
            .await
            .map_domain_infra("Failed to record inbox entry")?;

        Ok(())
    }
}
