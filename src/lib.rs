//! Application keys
//!
//! Lifecycle of the SSH and PGP key pairs attached to applications:
//! - Key naming policy and type-specific generation
//! - Transactional key storage (in-memory and PostgreSQL)
//! - Immutability of repository-linked applications
//! - Lifecycle events for added and deleted keys

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::KeyEventPublisher;
use infrastructure::event::LoggingEventPublisher;
use infrastructure::key::{ApplicationKeyService, KeyGeneratorRegistry};
use infrastructure::storage::{PgApplicationRepository, PgKeyStore};
use tracing::info;

/// Wire the key service against PostgreSQL, logging lifecycle events
pub async fn create_key_service(
    config: &AppConfig,
) -> anyhow::Result<ApplicationKeyService<PgKeyStore>> {
    create_key_service_with_events(config, Arc::new(LoggingEventPublisher::new())).await
}

/// Wire the key service against PostgreSQL with a caller-chosen publisher
///
/// Embedding callers pass a [`BroadcastEventPublisher`] here and subscribe to
/// it to observe key events in-process.
///
/// [`BroadcastEventPublisher`]: infrastructure::event::BroadcastEventPublisher
pub async fn create_key_service_with_events(
    config: &AppConfig,
    events: Arc<dyn KeyEventPublisher>,
) -> anyhow::Result<ApplicationKeyService<PgKeyStore>> {
    config.keys.validate()?;

    let pool = config.database.to_postgres_config().connect().await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to PostgreSQL"
    );

    let generators = KeyGeneratorRegistry::with_rsa_bits(
        config.keys.ssh_rsa_bits,
        config.keys.pgp_rsa_bits,
    );

    Ok(ApplicationKeyService::new(
        Arc::new(PgApplicationRepository::new(pool.clone())),
        Arc::new(PgKeyStore::new(pool)),
        Arc::new(generators),
        events,
    ))
}
