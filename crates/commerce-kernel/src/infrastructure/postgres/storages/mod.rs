// crates/commerce-kernel/src/infrastructure/postgres/storages/mod.rs

mod postgres_inbox_guard;
mod postgres_outbox_store;

pub use postgres_inbox_guard::PostgresInboxGuard;
pub use postgres_outbox_store::PostgresOutboxStore;
