//! Key entity and related types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::application::ApplicationId;
use crate::domain::DomainError;

/// Algorithm family of a key pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Ssh,
    Pgp,
}

impl KeyType {
    /// Every supported key type
    pub const ALL: [KeyType; 2] = [KeyType::Ssh, KeyType::Pgp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ssh => "ssh",
            Self::Pgp => "pgp",
        }
    }

    /// Whether generation of this type yields a key identifier
    pub fn has_key_id(&self) -> bool {
        matches!(self, Self::Pgp)
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ssh" => Ok(Self::Ssh),
            "pgp" => Ok(Self::Pgp),
            other => Err(DomainError::unknown_key_type(other)),
        }
    }
}

/// Freshly generated key pair, before it is bound to an application
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    key_type: KeyType,
    public: String,
    private: String,
    key_id: Option<String>,
}

impl KeyMaterial {
    pub fn ssh(public: impl Into<String>, private: impl Into<String>) -> Self {
        Self {
            key_type: KeyType::Ssh,
            public: public.into(),
            private: private.into(),
            key_id: None,
        }
    }

    pub fn pgp(
        public: impl Into<String>,
        private: impl Into<String>,
        key_id: impl Into<String>,
    ) -> Self {
        Self {
            key_type: KeyType::Pgp,
            public: public.into(),
            private: private.into(),
            key_id: Some(key_id.into()),
        }
    }

    /// Rebuild material read back from storage, checking its shape
    pub fn from_stored(
        key_type: KeyType,
        public: String,
        private: String,
        key_id: Option<String>,
    ) -> Result<Self, DomainError> {
        let key_id = key_id.filter(|id| !id.is_empty());

        match (key_type, key_id) {
            (KeyType::Ssh, None) => Ok(Self::ssh(public, private)),
            (KeyType::Pgp, Some(id)) => Ok(Self::pgp(public, private, id)),
            (KeyType::Ssh, Some(_)) => Err(DomainError::storage(
                "stored ssh key unexpectedly carries a key id",
            )),
            (KeyType::Pgp, None) => Err(DomainError::storage("stored pgp key has no key id")),
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn public(&self) -> &str {
        &self.public
    }

    pub fn private(&self) -> &str {
        &self.private
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key_type", &self.key_type)
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .field("key_id", &self.key_id)
            .finish()
    }
}

/// A key pair owned by an application
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    name: String,
    #[serde(rename = "type")]
    key_type: KeyType,
    public: String,
    private: String,
    #[serde(rename = "keyID", default, skip_serializing_if = "Option::is_none")]
    key_id: Option<String>,
    #[serde(rename = "application_id")]
    owner_id: ApplicationId,
}

impl Key {
    /// Bind generated material to its owning application
    pub fn new(owner_id: ApplicationId, name: impl Into<String>, material: KeyMaterial) -> Self {
        Self {
            name: name.into(),
            key_type: material.key_type,
            public: material.public,
            private: material.private,
            key_id: material.key_id,
            owner_id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn public(&self) -> &str {
        &self.public
    }

    pub fn private(&self) -> &str {
        &self.private
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    pub fn owner_id(&self) -> ApplicationId {
        self.owner_id
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.name)
            .field("key_type", &self.key_type)
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .field("key_id", &self.key_id)
            .field("owner_id", &self.owner_id)
            .finish()
    }
}
