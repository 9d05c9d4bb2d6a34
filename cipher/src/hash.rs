use digest::Digest;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::CipherError;

/// Hash functions usable for OAEP, MGF1 and signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha1,
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

// DER of DigestInfo up to the digest OCTET STRING contents, RFC 8017 §9.2 note 1
const SHA1_PREFIX: [u8; 15] = [
    0x30, 0x21, 0x30, 0x09, 0x06, 0x05, 0x2b, 0x0e, 0x03, 0x02, 0x1a, 0x05, 0x00, 0x04, 0x14,
];
const SHA224_PREFIX: [u8; 19] = [
    0x30, 0x2d, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x04, 0x05,
    0x00, 0x04, 0x1c,
];
const SHA256_PREFIX: [u8; 19] = [
    0x30, 0x31, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01, 0x05,
    0x00, 0x04, 0x20,
];
const SHA384_PREFIX: [u8; 19] = [
    0x30, 0x41, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x02, 0x05,
    0x00, 0x04, 0x30,
];
const SHA512_PREFIX: [u8; 19] = [
    0x30, 0x51, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x03, 0x05,
    0x00, 0x04, 0x40,
];

impl HashAlgorithm {
    /// digest length in bytes
    pub const fn output_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha224 => 28,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    pub fn digest(&self, msg: &[u8]) -> Vec<u8> {
        self.digest_parts(&[msg])
    }

    /// H(parts[0] || parts[1] || ...)
    pub(crate) fn digest_parts(&self, parts: &[&[u8]]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha1 => hash_parts::<sha1::Sha1>(parts),
            HashAlgorithm::Sha224 => hash_parts::<sha2::Sha224>(parts),
            HashAlgorithm::Sha256 => hash_parts::<sha2::Sha256>(parts),
            HashAlgorithm::Sha384 => hash_parts::<sha2::Sha384>(parts),
            HashAlgorithm::Sha512 => hash_parts::<sha2::Sha512>(parts),
        }
    }

    pub(crate) const fn digest_info_prefix(&self) -> &'static [u8] {
        match self {
            HashAlgorithm::Sha1 => &SHA1_PREFIX,
            HashAlgorithm::Sha224 => &SHA224_PREFIX,
            HashAlgorithm::Sha256 => &SHA256_PREFIX,
            HashAlgorithm::Sha384 => &SHA384_PREFIX,
            HashAlgorithm::Sha512 => &SHA512_PREFIX,
        }
    }
}

fn hash_parts<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for p in parts {
        hasher.update(p);
    }
    hasher.finalize().to_vec()
}

impl Display for HashAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = CipherError;

    /// accepts `sha256`, `SHA-256` and `sha_256` alike
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match name.as_str() {
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(CipherError::InvalidParameter(format!(
                "unsupported hash algorithm `{s}`"
            ))),
        }
    }
}
