//! Storage infrastructure - Key store and application lookup backends

mod in_memory;
pub mod migrations;
mod postgres;

pub use in_memory::{
    InMemoryApplicationRepository, InMemoryKeyStore, InMemoryKeyTransaction, StoreFault,
};
pub use migrations::{key_migrations, run_key_migrations, Migration, Migrator, PostgresMigrator};
pub use postgres::{PgApplicationRepository, PgKeyStore, PgKeyTransaction, PostgresConfig};
