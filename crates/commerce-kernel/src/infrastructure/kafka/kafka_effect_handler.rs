// crates/commerce-kernel/src/infrastructure/kafka/kafka_effect_handler.rs

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;
use crate::application::ports::IntegrationEventHandler;
use crate::domain::events::IntegrationEvent;
use crate::errors::{AppError, AppResult, DomainError, ErrorCode, Result};

/// Effet externe canonique : publication de l'événement d'intégration sur un
/// topic Kafka. Le partitionnement par `event_id` répartit la charge ;
/// l'ordre global n'est pas un contrat du dispatcher.
pub struct KafkaEffectHandler {
    producer: FutureProducer,
    default_topic: String,
}

impl KafkaEffectHandler {
    pub fn new(brokers: &str, default_topic: String) -> AppResult<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            // --- OPTIMISATIONS  ---
            .set("compression.type", "snappy") // Compromis idéal CPU/Taille
            .set("acks", "all")                // Sécurité maximale
            .set("queue.buffering.max.ms", "5") // Attente minime pour grouper les messages
            .set("batch.num.messages", "1000")  // Taille de batch idéale
            .set("linger.ms", "10")             // Laisse le temps au batch de se remplir
            .create()
            .map_err(|e| AppError::new(ErrorCode::InternalError, format!("Kafka config error: {e}")))?;

        Ok(Self { producer, default_topic })
    }
}

#[async_trait]
impl IntegrationEventHandler for KafkaEffectHandler {
    async fn handle(&self, event: &IntegrationEvent) -> Result<()> {
        let payload = serde_json::to_string(event)
            .map_err(|e| DomainError::Internal(format!("Event serialization failed: {e}")))?;

        let key = event
            .event_id
            .map(|id| id.to_string())
            .unwrap_or_default();
        let event_name = event.event_name.as_deref().unwrap_or("unknown");
        let record = FutureRecord::to(&self.default_topic)
            .payload(&payload)
            .key(&key)
            .headers(OwnedHeaders::new()
                .insert(Header {
                    key: "event_name",
                    value: Some(event_name), // ex: "product.created"
                })
            );

        self.producer
            .send(record, Duration::from_secs(5))
            .await
            .map_err(|(e, _)| DomainError::Infrastructure(format!("Kafka publish failed: {e}")))?;

        Ok(())
    }
}
