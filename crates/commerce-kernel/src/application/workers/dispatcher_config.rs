// crates/commerce-kernel/src/application/workers/dispatcher_config.rs

use std::time::Duration;
use crate::errors::{AppError, AppResult, ErrorCode};

/// Réglages du dispatcher. Le lease est large (moins d'allers-retours DB),
/// la concurrence de traitement est étroite (charge aval bornée).
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Nombre max de lignes leasées par cycle. 0 désactive le leasing.
    pub lease_batch_size: u32,
    /// Nombre max de pipelines par message en parallèle. 0 désactive le traitement.
    pub process_batch_size: u32,
    /// Nombre de tentatives avant transfert en dead-letter (>= 1).
    pub max_attempts: u32,
    /// Période cible d'un cycle de polling.
    pub poll_interval: Duration,
    /// Attente maximale des pipelines en vol lors de l'arrêt.
    pub shutdown_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            lease_batch_size: 100,
            process_batch_size: 10,
            max_attempts: 5,
            poll_interval: Duration::from_millis(20),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl DispatcherConfig {
    pub fn from_env() -> AppResult<Self> {
        let lease_batch_size = std::env::var("OUTBOX_LEASE_BATCH_SIZE")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<u32>()
            .map_err(|_| AppError::new(ErrorCode::InternalError, "Invalid OUTBOX_LEASE_BATCH_SIZE"))?;

        let process_batch_size = std::env::var("OUTBOX_PROCESS_BATCH_SIZE")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .map_err(|_| AppError::new(ErrorCode::InternalError, "Invalid OUTBOX_PROCESS_BATCH_SIZE"))?;

        let max_attempts = std::env::var("OUTBOX_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .map_err(|_| AppError::new(ErrorCode::InternalError, "Invalid OUTBOX_MAX_ATTEMPTS"))?;

        if max_attempts == 0 {
            return Err(AppError::new(
                ErrorCode::InternalError,
                "OUTBOX_MAX_ATTEMPTS must be >= 1",
            ));
        }

        let poll_interval_ms = std::env::var("OUTBOX_POLLING_MS")
            .unwrap_or_else(|_| "20".to_string())
            .parse::<u64>()
            .map_err(|_| AppError::new(ErrorCode::InternalError, "Invalid OUTBOX_POLLING_MS"))?;

        let shutdown_timeout_ms = std::env::var("OUTBOX_SHUTDOWN_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse::<u64>()
            .map_err(|_| AppError::new(ErrorCode::InternalError, "Invalid OUTBOX_SHUTDOWN_TIMEOUT_MS"))?;

        let config = Self {
            lease_batch_size,
            process_batch_size,
            max_attempts,
            poll_interval: Duration::from_millis(poll_interval_ms),
            shutdown_timeout: Duration::from_millis(shutdown_timeout_ms),
        };

        // Pathologie de configuration : on prévient au démarrage plutôt que
        // de deviner l'intention (les lignes leasées resteraient in_progress
        // jusqu'à la récupération des leases périmés).
        if config.process_batch_size == 0 {
            tracing::warn!(
                "⚠️ OUTBOX_PROCESS_BATCH_SIZE=0: leased messages will not be processed"
            );
        }

        Ok(config)
    }
}
