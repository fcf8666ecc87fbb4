//! Key generator trait

use std::fmt::Debug;

use super::entity::{KeyMaterial, KeyType};
use crate::domain::DomainError;

/// Produces fresh key pairs of one algorithm family
///
/// Generation is CPU bound and touches no persisted state.
pub trait KeyGenerator: Send + Sync + Debug {
    /// The key type this generator produces
    fn key_type(&self) -> KeyType;

    /// Generate a new key pair labelled with `name`
    fn generate(&self, name: &str) -> Result<KeyMaterial, DomainError>;
}
