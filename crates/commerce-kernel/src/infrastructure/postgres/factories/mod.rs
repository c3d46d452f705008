// crates/commerce-kernel/src/infrastructure/postgres/factories/mod.rs

mod postgres_config;

pub use postgres_config::{PostgresConfig, create_postgres_pool};
