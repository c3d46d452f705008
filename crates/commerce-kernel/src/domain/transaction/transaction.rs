// crates/commerce-kernel/src/domain/transaction/transaction.rs

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use crate::errors::Result;

/// Transaction en cours. Les verrous de lignes pris pendant la transaction
/// sont tenus jusqu'au commit (ou au rollback implicite si elle est droppée).
/// Le handle reste aux mains d'un seul appelant : Send suffit.
pub trait Transaction: Send + Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn commit(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
