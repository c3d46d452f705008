// crates/commerce-kernel/src/lib.rs

pub mod domain;
pub mod application;
pub mod errors;
pub mod clock;
pub mod infrastructure;
pub mod utils;
