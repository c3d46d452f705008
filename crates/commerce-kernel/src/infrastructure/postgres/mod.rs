// crates/commerce-kernel/src/infrastructure/postgres/mod.rs

pub mod factories;
pub mod mappers;
pub mod rows;
pub mod storages;
pub mod transactions;
pub mod utils;

pub use factories::{PostgresConfig, create_postgres_pool};
pub use mappers::SqlxErrorExt;
pub use rows::OutboxRow;
pub use storages::{PostgresInboxGuard, PostgresOutboxStore};
pub use transactions::{PostgresTransaction, PostgresTransactionManager, TransactionExt};
