//! Key generation backends and the key lifecycle service

mod armor;
mod pgp;
mod registry;
mod service;
mod ssh;

pub use armor::{armor, crc24, ArmorKind};
pub use pgp::{PgpKeyGenerator, DEFAULT_PGP_RSA_BITS};
pub use registry::KeyGeneratorRegistry;
pub use service::{AddKeyRequest, ApplicationKeyService};
pub use ssh::{authorized_key, SshKeyGenerator, DEFAULT_SSH_RSA_BITS};
