//! SSH key pair generation
//!
//! Produces RSA key pairs with the public half in OpenSSH `authorized_keys`
//! format and the private half as a PKCS#1 PEM document.

use base64::{engine::general_purpose::STANDARD, Engine};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};

use crate::domain::{DomainError, KeyGenerator, KeyMaterial, KeyType};

/// Default RSA modulus size for SSH keys
pub const DEFAULT_SSH_RSA_BITS: usize = 4096;

const SSH_RSA: &str = "ssh-rsa";

/// Generator for RSA SSH keys
#[derive(Debug, Clone)]
pub struct SshKeyGenerator {
    bits: usize,
}

impl SshKeyGenerator {
    pub fn new(bits: usize) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> usize {
        self.bits
    }
}

impl Default for SshKeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SSH_RSA_BITS)
    }
}

impl KeyGenerator for SshKeyGenerator {
    fn key_type(&self) -> KeyType {
        KeyType::Ssh
    }

    fn generate(&self, name: &str) -> Result<KeyMaterial, DomainError> {
        let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), self.bits).map_err(|e| {
            DomainError::generation(format!("cannot generate {}-bit RSA key: {}", self.bits, e))
        })?;

        let private = private_key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| DomainError::generation(format!("cannot encode private key: {}", e)))?;

        let public = authorized_key(&private_key.to_public_key(), name);

        Ok(KeyMaterial::ssh(public, private.to_string()))
    }
}

/// Render an RSA public key as an `authorized_keys` line
pub fn authorized_key(public: &RsaPublicKey, comment: &str) -> String {
    let mut blob = Vec::new();
    put_string(&mut blob, SSH_RSA.as_bytes());
    put_mpint(&mut blob, public.e());
    put_mpint(&mut blob, public.n());

    format!("{} {} {}", SSH_RSA, STANDARD.encode(&blob), comment)
}

fn put_string(buf: &mut Vec<u8>, data: &[u8]) {
    buf.extend_from_slice(&(data.len() as u32).to_be_bytes());
    buf.extend_from_slice(data);
}

// Two's complement: a set high bit needs a leading zero byte.
fn put_mpint(buf: &mut Vec<u8>, value: &BigUint) {
    let mut bytes = value.to_bytes_be();
    if bytes.first().is_some_and(|b| b & 0x80 != 0) {
        bytes.insert(0, 0);
    }
    put_string(buf, &bytes);
}
