//! Key lifecycle events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::application::Application;
use crate::domain::context::Actor;
use crate::domain::key::Key;

/// What happened to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyEventKind {
    KeyAdded,
    KeyDeleted,
}

impl KeyEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeyAdded => "key_added",
            Self::KeyDeleted => "key_deleted",
        }
    }
}

impl std::fmt::Display for KeyEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification emitted after a key mutation commits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    id: Uuid,
    kind: KeyEventKind,
    project_key: String,
    application: Application,
    key: Key,
    actor: Actor,
    occurred_at: DateTime<Utc>,
}

impl KeyEvent {
    /// Build an event; the application is stored without its key collection
    pub fn new(
        kind: KeyEventKind,
        project_key: impl Into<String>,
        application: &Application,
        key: Key,
        actor: Actor,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            project_key: project_key.into(),
            application: application.snapshot(),
            key,
            actor,
            occurred_at: Utc::now(),
        }
    }

    pub fn key_added(
        project_key: impl Into<String>,
        application: &Application,
        key: Key,
        actor: Actor,
    ) -> Self {
        Self::new(KeyEventKind::KeyAdded, project_key, application, key, actor)
    }

    pub fn key_deleted(
        project_key: impl Into<String>,
        application: &Application,
        key: Key,
        actor: Actor,
    ) -> Self {
        Self::new(KeyEventKind::KeyDeleted, project_key, application, key, actor)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> KeyEventKind {
        self.kind
    }

    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    pub fn application(&self) -> &Application {
        &self.application
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
