//! OpenPGP ASCII armor

use base64::{engine::general_purpose::STANDARD, Engine};

const LINE_WIDTH: usize = 64;
const CRC24_INIT: u32 = 0x00B7_04CE;
const CRC24_POLY: u32 = 0x0186_4CFB;

/// Armored block types produced for keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmorKind {
    PublicKey,
    PrivateKey,
}

impl ArmorKind {
    fn label(&self) -> &'static str {
        match self {
            Self::PublicKey => "PGP PUBLIC KEY BLOCK",
            Self::PrivateKey => "PGP PRIVATE KEY BLOCK",
        }
    }
}

/// Wrap binary packets in an armored block with its CRC-24 checksum
pub fn armor(kind: ArmorKind, data: &[u8]) -> String {
    let body = STANDARD.encode(data);
    let checksum = crc24(data).to_be_bytes();

    let mut out = format!("-----BEGIN {}-----\n\n", kind.label());
    for line in body.as_bytes().chunks(LINE_WIDTH) {
        // base64 output is ASCII
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push('=');
    out.push_str(&STANDARD.encode(&checksum[1..]));
    out.push('\n');
    out.push_str(&format!("-----END {}-----\n", kind.label()));

    out
}

pub fn crc24(data: &[u8]) -> u32 {
    let mut crc = CRC24_INIT;
    for byte in data {
        crc ^= u32::from(*byte) << 16;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x0100_0000 != 0 {
                crc ^= CRC24_POLY;
            }
        }
    }
    crc & 0x00FF_FFFF
}
