//! OpenPGP key pair generation
//!
//! Builds version 4 transferable RSA keys: a primary key packet, a user ID
//! packet carrying the key name, and a positive self-certification signed
//! with SHA-256. Both halves are returned ASCII-armored. The secret key
//! material is stored unprotected; the record itself is the secret.

use chrono::Utc;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, Pkcs1v15Sign, RsaPrivateKey};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use super::armor::{armor, ArmorKind};
use crate::domain::{DomainError, KeyGenerator, KeyMaterial, KeyType};

/// Default RSA modulus size for PGP keys
pub const DEFAULT_PGP_RSA_BITS: usize = 2048;

const TAG_SIGNATURE: u8 = 2;
const TAG_SECRET_KEY: u8 = 5;
const TAG_PUBLIC_KEY: u8 = 6;
const TAG_USER_ID: u8 = 13;

const KEY_VERSION: u8 = 4;
const ALGORITHM_RSA: u8 = 1;
const HASH_SHA256: u8 = 8;
const POSITIVE_CERTIFICATION: u8 = 0x13;

const SUBPACKET_CREATION_TIME: u8 = 2;
const SUBPACKET_PREFERRED_SYMMETRIC: u8 = 11;
const SUBPACKET_ISSUER: u8 = 16;
const SUBPACKET_PREFERRED_HASH: u8 = 21;
const SUBPACKET_KEY_FLAGS: u8 = 27;
const SUBPACKET_ISSUER_FINGERPRINT: u8 = 33;

const FLAG_CERTIFY: u8 = 0x01;
const FLAG_SIGN: u8 = 0x02;

// AES-256, AES-192, AES-128
const PREFERRED_SYMMETRIC: [u8; 3] = [9, 8, 7];
// SHA-256, SHA-512
const PREFERRED_HASH: [u8; 2] = [8, 10];

/// Generator for RSA OpenPGP keys
#[derive(Debug, Clone)]
pub struct PgpKeyGenerator {
    bits: usize,
}

impl PgpKeyGenerator {
    pub fn new(bits: usize) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> usize {
        self.bits
    }
}

impl Default for PgpKeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PGP_RSA_BITS)
    }
}

impl KeyGenerator for PgpKeyGenerator {
    fn key_type(&self) -> KeyType {
        KeyType::Pgp
    }

    fn generate(&self, name: &str) -> Result<KeyMaterial, DomainError> {
        let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), self.bits).map_err(|e| {
            DomainError::generation(format!("cannot generate {}-bit RSA key: {}", self.bits, e))
        })?;

        let created = u32::try_from(Utc::now().timestamp()).map_err(|_| {
            DomainError::generation("system clock is outside the OpenPGP timestamp range")
        })?;

        let certificate = Certificate::new(&private_key, name, created)?;

        Ok(KeyMaterial::pgp(
            armor(ArmorKind::PublicKey, &certificate.public_packets()),
            armor(ArmorKind::PrivateKey, &certificate.secret_packets()),
            certificate.key_id_hex(),
        ))
    }
}

/// Encoded packets of one self-certified key
struct Certificate {
    public_body: Vec<u8>,
    secret_body: Vec<u8>,
    user_id: Vec<u8>,
    signature: Vec<u8>,
    fingerprint: [u8; 20],
}

impl Certificate {
    fn new(private_key: &RsaPrivateKey, name: &str, created: u32) -> Result<Self, DomainError> {
        let public_body = public_key_body(private_key, created);
        let fingerprint = fingerprint(&public_body);
        let user_id = name.as_bytes().to_vec();
        let signature =
            self_certification(private_key, &public_body, &user_id, &fingerprint, created)?;
        let secret_body = secret_key_body(private_key, &public_body)?;

        Ok(Self {
            public_body,
            secret_body,
            user_id,
            signature,
            fingerprint,
        })
    }

    /// The low 64 bits of the fingerprint
    fn key_id(&self) -> &[u8] {
        &self.fingerprint[12..]
    }

    fn key_id_hex(&self) -> String {
        hex::encode_upper(self.key_id())
    }

    fn public_packets(&self) -> Vec<u8> {
        self.packets(TAG_PUBLIC_KEY, &self.public_body)
    }

    fn secret_packets(&self) -> Vec<u8> {
        self.packets(TAG_SECRET_KEY, &self.secret_body)
    }

    fn packets(&self, key_tag: u8, key_body: &[u8]) -> Vec<u8> {
        let mut out = packet(key_tag, key_body);
        out.extend(packet(TAG_USER_ID, &self.user_id));
        out.extend(packet(TAG_SIGNATURE, &self.signature));
        out
    }
}

fn public_key_body(private_key: &RsaPrivateKey, created: u32) -> Vec<u8> {
    let mut body = vec![KEY_VERSION];
    body.extend_from_slice(&created.to_be_bytes());
    body.push(ALGORITHM_RSA);
    body.extend(mpi(private_key.n()));
    body.extend(mpi(private_key.e()));
    body
}

fn fingerprint(public_body: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update([0x99]);
    hasher.update((public_body.len() as u16).to_be_bytes());
    hasher.update(public_body);

    let mut fingerprint = [0u8; 20];
    fingerprint.copy_from_slice(&hasher.finalize());
    fingerprint
}

fn secret_key_body(private_key: &RsaPrivateKey, public_body: &[u8]) -> Result<Vec<u8>, DomainError> {
    let primes = private_key.primes();
    if primes.len() != 2 {
        return Err(DomainError::generation(
            "multi-prime RSA keys cannot be exported as OpenPGP keys",
        ));
    }

    // OpenPGP requires p < q and u = p^-1 mod q
    let (p, q) = if primes[0] < primes[1] {
        (&primes[0], &primes[1])
    } else {
        (&primes[1], &primes[0])
    };
    let u = p.modpow(&(q - &BigUint::from(2u32)), q);

    let mut secret = Vec::new();
    for value in [private_key.d(), p, q, &u] {
        secret.extend(mpi(value));
    }
    let checksum = secret
        .iter()
        .fold(0u16, |acc, byte| acc.wrapping_add(u16::from(*byte)));

    let mut body = public_body.to_vec();
    // s2k usage 0: unencrypted
    body.push(0);
    body.extend(secret);
    body.extend_from_slice(&checksum.to_be_bytes());
    Ok(body)
}

fn self_certification(
    private_key: &RsaPrivateKey,
    public_body: &[u8],
    user_id: &[u8],
    fingerprint: &[u8; 20],
    created: u32,
) -> Result<Vec<u8>, DomainError> {
    let mut issuer_fingerprint = vec![KEY_VERSION];
    issuer_fingerprint.extend_from_slice(fingerprint);

    let mut hashed = Vec::new();
    subpacket(&mut hashed, SUBPACKET_CREATION_TIME, &created.to_be_bytes());
    subpacket(&mut hashed, SUBPACKET_KEY_FLAGS, &[FLAG_CERTIFY | FLAG_SIGN]);
    subpacket(&mut hashed, SUBPACKET_PREFERRED_SYMMETRIC, &PREFERRED_SYMMETRIC);
    subpacket(&mut hashed, SUBPACKET_PREFERRED_HASH, &PREFERRED_HASH);
    subpacket(&mut hashed, SUBPACKET_ISSUER_FINGERPRINT, &issuer_fingerprint);

    let mut unhashed = Vec::new();
    subpacket(&mut unhashed, SUBPACKET_ISSUER, &fingerprint[12..]);

    let mut body = vec![KEY_VERSION, POSITIVE_CERTIFICATION, ALGORITHM_RSA, HASH_SHA256];
    body.extend_from_slice(&(hashed.len() as u16).to_be_bytes());
    body.extend(hashed);

    let digest = certification_digest(public_body, user_id, &body);
    let signature = private_key
        .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
        .map_err(|e| DomainError::generation(format!("cannot self-certify key: {}", e)))?;

    body.extend_from_slice(&(unhashed.len() as u16).to_be_bytes());
    body.extend(unhashed);
    body.extend_from_slice(&digest[..2]);
    body.extend(mpi(&BigUint::from_bytes_be(&signature)));
    Ok(body)
}

/// SHA-256 over key, user ID and the hashed part of the signature
fn certification_digest(public_body: &[u8], user_id: &[u8], signed_part: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update([0x99]);
    hasher.update((public_body.len() as u16).to_be_bytes());
    hasher.update(public_body);
    hasher.update([0xB4]);
    hasher.update((user_id.len() as u32).to_be_bytes());
    hasher.update(user_id);
    hasher.update(signed_part);
    hasher.update([KEY_VERSION, 0xFF]);
    hasher.update((signed_part.len() as u32).to_be_bytes());
    hasher.finalize().to_vec()
}

fn mpi(value: &BigUint) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    let mut out = Vec::with_capacity(bytes.len() + 2);
    out.extend_from_slice(&(value.bits() as u16).to_be_bytes());
    out.extend(bytes);
    out
}

// Every subpacket written here is shorter than 192 bytes.
fn subpacket(out: &mut Vec<u8>, kind: u8, data: &[u8]) {
    out.push((data.len() + 1) as u8);
    out.push(kind);
    out.extend_from_slice(data);
}

/// New-format packet header followed by the body
fn packet(tag: u8, body: &[u8]) -> Vec<u8> {
    let len = body.len();
    let mut out = vec![0xC0 | tag];

    if len < 192 {
        out.push(len as u8);
    } else if len < 8384 {
        let len = len - 192;
        out.push(((len >> 8) + 192) as u8);
        out.push((len & 0xFF) as u8);
    } else {
        out.push(0xFF);
        out.extend_from_slice(&(len as u32).to_be_bytes());
    }

    out.extend_from_slice(body);
    out
}
