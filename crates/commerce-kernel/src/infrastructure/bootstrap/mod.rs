// crates/commerce-kernel/src/infrastructure/bootstrap/mod.rs

mod dispatcher;

pub use dispatcher::run_outbox_dispatcher;
