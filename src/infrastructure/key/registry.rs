//! Key generator registry
//!
//! Dispatches generation requests to the generator registered for a key
//! type.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{DomainError, KeyGenerator, KeyType};

use super::pgp::{PgpKeyGenerator, DEFAULT_PGP_RSA_BITS};
use super::ssh::{SshKeyGenerator, DEFAULT_SSH_RSA_BITS};

/// Generators indexed by the key type they produce
#[derive(Debug, Default)]
pub struct KeyGeneratorRegistry {
    generators: HashMap<KeyType, Arc<dyn KeyGenerator>>,
}

impl KeyGeneratorRegistry {
    /// Empty registry; every lookup fails until generators are registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the default RSA sizes for every supported type
    pub fn standard() -> Self {
        Self::with_rsa_bits(DEFAULT_SSH_RSA_BITS, DEFAULT_PGP_RSA_BITS)
    }

    /// Registry with the RSA generators for every supported type
    pub fn with_rsa_bits(ssh_bits: usize, pgp_bits: usize) -> Self {
        Self::new()
            .register(Arc::new(SshKeyGenerator::new(ssh_bits)))
            .register(Arc::new(PgpKeyGenerator::new(pgp_bits)))
    }

    /// Add a generator, replacing any previous one for the same type
    pub fn register(mut self, generator: Arc<dyn KeyGenerator>) -> Self {
        self.generators.insert(generator.key_type(), generator);
        self
    }

    /// Resolve the generator for a raw type name
    pub fn resolve(&self, key_type: &str) -> Result<Arc<dyn KeyGenerator>, DomainError> {
        let parsed: KeyType = key_type.parse()?;
        self.get(parsed)
            .ok_or_else(|| DomainError::unknown_key_type(key_type))
    }

    pub fn get(&self, key_type: KeyType) -> Option<Arc<dyn KeyGenerator>> {
        self.generators.get(&key_type).cloned()
    }

    /// Registered types in declaration order
    pub fn supported_types(&self) -> Vec<KeyType> {
        KeyType::ALL
            .into_iter()
            .filter(|t| self.generators.contains_key(t))
            .collect()
    }
}
