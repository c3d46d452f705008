// crates/commerce-kernel/src/domain/mod.rs

pub mod events;
pub mod outbox;
pub mod repositories;
pub mod transaction;
