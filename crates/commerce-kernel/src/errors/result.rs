// crates/commerce-kernel/src/errors/result.rs

use crate::errors::{AppError, DomainError};

/// RESULT DU DOMAINE (Interne)
/// Utilisé par : Stores, Handlers (Ports), composants du dispatcher.
pub type Result<T> = std::result::Result<T, DomainError>;

/// RESULT D'APPLICATION (Exécutable)
/// Utilisé par : Workers, bootstrap, binaires.
pub type AppResult<T> = std::result::Result<T, AppError>;
