// crates/commerce-kernel/src/infrastructure/postgres/transactions/postgres_transaction_manager.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use crate::domain::transaction::{Transaction, TransactionManager};
use crate::errors::Result;
use crate::infrastructure::postgres::mappers::SqlxErrorExt;
use crate::infrastructure::postgres::transactions::PostgresTransaction;

pub struct PostgresTransactionManager {
    pool: Pool<Postgres>,
}

impl PostgresTransactionManager {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PostgresTransactionManager {
    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_domain_infra("Failed to begin transaction")?;

        Ok(Box::new(PostgresTransaction::new(tx)))
    }
}
