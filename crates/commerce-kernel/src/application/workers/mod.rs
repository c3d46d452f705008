// crates/commerce-kernel/src/application/workers/mod.rs

mod batch_processor;
mod dispatcher_config;
mod lease_manager;
mod message_processor;
mod outbox_dispatcher;

#[cfg(test)]
mod lease_manager_test;
#[cfg(test)]
mod outbox_dispatcher_test;

pub use batch_processor::BatchProcessor;
pub use dispatcher_config::DispatcherConfig;
pub use lease_manager::LeaseManager;
pub use message_processor::MessageProcessor;
pub use outbox_dispatcher::OutboxDispatcher;
