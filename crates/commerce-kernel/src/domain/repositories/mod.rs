// crates/commerce-kernel/src/domain/repositories/mod.rs

mod outbox_store;

pub use outbox_store::{OutboxStore, STALE_LEASE_SECONDS, stale_lease};
