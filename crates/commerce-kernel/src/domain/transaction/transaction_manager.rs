// crates/commerce-kernel/src/domain/transaction/transaction_manager.rs

use async_trait::async_trait;
use crate::domain::transaction::Transaction;
use crate::errors::Result;

/// Ouvre des transactions. L'appelant enchaîne ses opérations sur le handle
/// retourné puis commit explicitement : les séquences select-puis-update du
/// leasing et du protocole d'échec en dépendent.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn Transaction>>;
}
