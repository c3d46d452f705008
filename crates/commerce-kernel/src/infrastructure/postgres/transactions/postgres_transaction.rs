// crates/commerce-kernel/src/infrastructure/postgres/transactions/postgres_transaction.rs

use std::future::Future;
use std::pin::Pin;
use sqlx::{Postgres, Transaction as PostgresTx};
use crate::domain::transaction::Transaction;
use crate::errors::{DomainError, Result};
use crate::infrastructure::postgres::mappers::SqlxErrorExt;

/// Enveloppe la transaction SQLx derrière le trait du domaine. Le commit
/// consomme la transaction interne ; la dropper sans commit déclenche le
/// rollback SQLx.
pub struct PostgresTransaction {
    inner: Option<PostgresTx<'static, Postgres>>,
}

impl PostgresTransaction {
    pub fn new(tx: PostgresTx<'static, Postgres>) -> Self {
        Self { inner: Some(tx) }
    }

    pub fn get_mut(&mut self) -> Result<&mut PostgresTx<'static, Postgres>> {
        self.inner
            .as_mut()
            .ok_or_else(|| DomainError::Internal("Transaction already committed".into()))
    }
}

impl Transaction for PostgresTransaction {
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn commit(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let tx = self
                .inner
                .take()
                .ok_or_else(|| DomainError::Internal("Transaction already committed".into()))?;

            tx.commit().await.map_domain_infra("Failed to commit transaction")
        })
    }
}

/// L'outil de conversion : les stores Postgres retrouvent la transaction
/// SQLx concrète derrière le trait objet.
pub trait TransactionExt {
    fn downcast_mut_sqlx(&mut self) -> Result<&mut PostgresTx<'static, Postgres>>;
}

impl TransactionExt for dyn Transaction + '_ {
    fn downcast_mut_sqlx(&mut self) -> Result<&mut PostgresTx<'static, Postgres>> {
        self.as_any_mut()
            .downcast_mut::<PostgresTransaction>()
            .ok_or_else(|| DomainError::Internal("Type mismatch: Expected PostgresTransaction".into()))?
            .get_mut()
    }
}
