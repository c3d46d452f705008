// crates/commerce-kernel/src/domain/outbox/mod.rs

mod dead_letter;
mod message;

pub use dead_letter::DeadLetterMessage;
pub use message::{OutboxMessage, OutboxStatus};
