// crates/commerce-kernel/src/clock/mod.rs

use chrono::{DateTime, Utc};

mod system;
pub use system::SystemClock;

/// Source de temps injectable (permet de figer l'horloge en test).
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
