// crates/commerce-kernel/src/application/ports/event_handler.rs

use async_trait::async_trait;
use crate::domain::events::IntegrationEvent;
use crate::errors::Result;

/// Capacité invoquée par le dispatcher pour chaque message : mise à jour de
/// projection d'un côté, émission d'effet externe de l'autre.
///
/// Un `Err` compte comme une tentative échouée (retry puis dead-letter).
/// Les implémentations doivent tolérer d'être rappelées plusieurs fois pour
/// le même `event_id` : l'idempotence est à leur charge (table inbox ou
/// équivalent), pas à celle du dispatcher.
#[async_trait]
pub trait IntegrationEventHandler: Send + Sync {
    async fn handle(&self, event: &IntegrationEvent) -> Result<()>;
}
