// crates/commerce-kernel/src/application/ports/mod.rs

mod event_handler;

pub use event_handler::IntegrationEventHandler;
