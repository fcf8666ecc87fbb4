//! Application key domain
//!
//! Domain types and traits for key pairs owned by applications: the key
//! entity, the naming policy, the generator capability and the
//! transactional key store.

mod entity;
mod generator;
mod naming;
mod repository;

pub use entity::{Key, KeyMaterial, KeyType};
pub use generator::KeyGenerator;
pub use naming::{
    normalize_and_validate, normalize_key_name, validate_key_name, APPLICATION_KEY_PREFIX,
    NAME_PATTERN,
};
pub use repository::{KeyStore, KeyTransaction};
