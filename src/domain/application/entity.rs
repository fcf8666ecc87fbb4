//! Application entity

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::key::Key;

/// Persisted identifier of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(i64);

impl ApplicationId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ApplicationId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A deployable unit within a project, owner of zero or more keys
///
/// Applications are read-only here; their lifecycle belongs to the
/// surrounding platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    id: ApplicationId,
    name: String,
    project_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    from_repository: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    keys: Vec<Key>,
}

impl Application {
    pub fn new(id: ApplicationId, project_key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            project_key: project_key.into(),
            from_repository: String::new(),
            keys: Vec::new(),
        }
    }

    /// Delegate the application's configuration to an external repository
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.from_repository = repository.into();
        self
    }

    pub fn with_keys(mut self, keys: Vec<Key>) -> Self {
        self.keys = keys;
        self
    }

    pub fn id(&self) -> ApplicationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    pub fn from_repository(&self) -> &str {
        &self.from_repository
    }

    /// Repository-linked applications have a frozen key collection
    pub fn is_repository_linked(&self) -> bool {
        !self.from_repository.is_empty()
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn into_keys(self) -> Vec<Key> {
        self.keys
    }

    /// Copy of the application without its key collection
    pub fn snapshot(&self) -> Self {
        Self {
            keys: Vec::new(),
            ..self.clone()
        }
    }
}

/// What to load alongside an application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub with_keys: bool,
}

impl LoadOptions {
    pub const DEFAULT: LoadOptions = LoadOptions { with_keys: false };
    pub const WITH_KEYS: LoadOptions = LoadOptions { with_keys: true };
}
