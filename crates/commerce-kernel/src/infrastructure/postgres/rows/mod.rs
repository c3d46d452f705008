// crates/commerce-kernel/src/infrastructure/postgres/rows/mod.rs

mod postgres_outbox_row;

pub use postgres_outbox_row::OutboxRow;
