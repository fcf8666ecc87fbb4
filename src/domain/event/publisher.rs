//! Event publisher trait

use async_trait::async_trait;

use super::entity::KeyEvent;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Best-effort delivery of key lifecycle events
///
/// Callers log and ignore publish failures; a failed notification never
/// fails the operation that produced it.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeyEventPublisher: Send + Sync {
    async fn publish(&self, event: KeyEvent) -> Result<(), DomainError>;
}
