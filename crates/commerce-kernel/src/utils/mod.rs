// crates/commerce-kernel/src/utils/mod.rs

#[cfg(any(test, feature = "test-utils"))]
pub mod handler_stub;
#[cfg(any(test, feature = "test-utils"))]
pub mod outbox_store_stub;

#[cfg(any(test, feature = "test-utils"))]
pub use handler_stub::{HandlerStub, integration_event_json};
#[cfg(any(test, feature = "test-utils"))]
pub use outbox_store_stub::{InMemoryOutboxStore, InMemoryTransactionManager};
