// crates/commerce-kernel/src/errors/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Le JSON de la colonne `event` ne produit pas un événement d'intégration exploitable
    #[error("Malformed integration event: {0}")]
    MalformedEvent(String),

    /// Erreur de concurrence (conflit de sérialisation, deadlock)
    #[error("Concurrency conflict: {reason}")]
    ConcurrencyConflict {
        reason: String
    },

    /// Erreur liée à l'infrastructure (DB, Kafka)
    #[error("Infrastructure failure: {0}")]
    Infrastructure(String),

    /// Erreur interne (ex: incohérence de câblage du dispatcher)
    #[error("Internal error: {0}")]
    Internal(String),
}
