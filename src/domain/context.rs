//! Request-scoped context passed explicitly into every operation

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::domain::DomainError;

/// Authenticated identity performing an operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    username: String,
}

impl Actor {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.username)
    }
}

/// Caller identity plus an optional deadline for one request
#[derive(Debug, Clone)]
pub struct RequestContext {
    actor: Actor,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Run `operation` within the request deadline, if any
    ///
    /// On expiry the future is dropped, which rolls back any transaction it
    /// still holds.
    pub async fn bounded<F, T>(&self, operation: &str, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_| DomainError::deadline_exceeded(operation.to_string()))?,
            None => fut.await,
        }
    }
}
