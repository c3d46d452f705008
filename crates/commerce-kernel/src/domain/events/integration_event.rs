// crates/commerce-kernel/src/domain/events/integration_event.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Fait publié décrivant un changement d'état, destiné aux consommateurs aval.
/// Le dispatcher n'interprète ni `event_name` ni `payload` : il les transmet
/// tels quels aux handlers, y compris quand le JSON est bancal. Chaque champ
/// logique absent ou illisible vaut simplement None ; c'est aux handlers de
/// rejeter ce qu'ils ne savent pas traiter.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationEvent {
    pub event_id: Option<Uuid>,
    pub event_name: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub correlation_id: Option<Uuid>,
    pub payload: Value,
}

impl IntegrationEvent {
    /// Extraction champ par champ, sans jamais échouer.
    pub fn from_value(value: &Value) -> Self {
        Self {
            event_id: parse_uuid(value.get("eventId")),
            event_name: value
                .get("eventName")
                .and_then(|v| v.as_str())
                .map(str::to_owned),
            occurred_at: value
                .get("occurredAt")
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
            correlation_id: parse_uuid(value.get("correlationId")),
            payload: value.get("payload").cloned().unwrap_or(Value::Null),
        }
    }
}

fn parse_uuid(value: Option<&Value>) -> Option<Uuid> {
    value
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
}
