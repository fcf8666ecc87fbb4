//! Event publisher writing key events to the log

use async_trait::async_trait;
use tracing::info;

use crate::domain::{DomainError, KeyEvent, KeyEventPublisher};

/// Logs each key event as one structured line; private material is never
/// written
#[derive(Debug, Clone, Default)]
pub struct LoggingEventPublisher;

impl LoggingEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl KeyEventPublisher for LoggingEventPublisher {
    async fn publish(&self, event: KeyEvent) -> Result<(), DomainError> {
        info!(
            event_id = %event.id(),
            kind = %event.kind(),
            project_key = %event.project_key(),
            application = %event.application().name(),
            key_name = %event.key().name(),
            key_type = %event.key().key_type(),
            key_id = event.key().key_id().unwrap_or_default(),
            actor = %event.actor(),
            occurred_at = %event.occurred_at(),
            "Key event"
        );
        Ok(())
    }
}
