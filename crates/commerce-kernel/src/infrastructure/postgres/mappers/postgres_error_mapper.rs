// crates/commerce-kernel/src/infrastructure/postgres/mappers/postgres_error_mapper.rs

use crate::errors::DomainError;

pub trait SqlxErrorExt<T> {
    fn map_domain_infra(self, context: &'static str) -> Result<T, DomainError>;
}

impl<T> SqlxErrorExt<T> for std::result::Result<T, sqlx::Error> {
    fn map_domain_infra(self, context: &'static str) -> Result<T, DomainError> {
        self.map_err(|e| match e {
            sqlx::Error::Database(db_err) => {
                // Conflit de sérialisation (40001) ou deadlock (40P01) :
                // le cycle suivant retentera
                let retryable = db_err
                    .code()
                    .map(|c| c == "40001" || c == "40P01")
                    .unwrap_or(false);

                if retryable {
                    DomainError::ConcurrencyConflict {
                        reason: format!("{}: {}", context, db_err.message()),
                    }
                } else {
                    DomainError::Infrastructure(format!("{}: {}", context, db_err.message()))
                }
            }
            _ => DomainError::Infrastructure(format!("{}: {}", context, e)),
        })
    }
}
