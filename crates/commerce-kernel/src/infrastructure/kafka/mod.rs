// crates/commerce-kernel/src/infrastructure/kafka/mod.rs

mod kafka_effect_handler;

pub use kafka_effect_handler::KafkaEffectHandler;
