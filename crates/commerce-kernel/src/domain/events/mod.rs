// crates/commerce-kernel/src/domain/events/mod.rs

mod integration_event;

pub use integration_event::IntegrationEvent;
