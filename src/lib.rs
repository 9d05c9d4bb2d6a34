//! RSA primitives: key codecs, key generation, encryption and signatures.
//!
//! The free functions draw randomness from the OS generator and take their policy from
//! [`RsaConfig::global`]; the `*_with_rng` forms in [`cipher::rsa`] accept any [`Rand`].

pub mod config;
mod handle;

pub use config::RsaConfig;
pub use handle::Rsa;

pub use cipher::rsa::{
    EncryptionScheme, Key, KeyEncoding, KeyFormat, KeyGenParams, KeyPolicy, KeySyntax, PrivateKey,
    PublicKey, SaltLength, SignatureScheme,
};
pub use cipher::{CipherError, DefaultRand, HashAlgorithm, Rand};
pub use num_bigint::BigUint;

use cipher::rsa;

/// Parses a key document, rejecting moduli below the configured minimum.
pub fn parse_key(data: &[u8], format: KeyFormat) -> Result<Key, CipherError> {
    parse_key_with_policy(data, format, &RsaConfig::global().key_policy())
}

pub fn parse_key_with_policy(
    data: &[u8],
    format: KeyFormat,
    policy: &KeyPolicy,
) -> Result<Key, CipherError> {
    Key::parse(data, format, policy)
}

pub fn serialize_key(key: &Key, format: KeyFormat) -> Result<Vec<u8>, CipherError> {
    key.serialize(format)
}

/// Two-prime key of `bits` bits, other generation parameters from the configuration.
pub fn generate_key(bits: usize, public_exponent: u64) -> Result<PrivateKey, CipherError> {
    let params = KeyGenParams {
        public_exponent,
        ..RsaConfig::global().keygen_params(bits)
    };
    rsa::generate_key(&params)
}

pub fn encrypt(
    key: &PublicKey,
    plaintext: &[u8],
    scheme: &EncryptionScheme,
) -> Result<Vec<u8>, CipherError> {
    rsa::encrypt_with_rng(key, plaintext, scheme, &mut DefaultRand::default())
}

pub fn decrypt(
    key: &PrivateKey,
    ciphertext: &[u8],
    scheme: &EncryptionScheme,
) -> Result<Vec<u8>, CipherError> {
    rsa::decrypt_with_rng(key, ciphertext, scheme, &mut DefaultRand::default())
}

pub fn sign(
    key: &PrivateKey,
    msg: &[u8],
    scheme: &SignatureScheme,
    hash: HashAlgorithm,
) -> Result<Vec<u8>, CipherError> {
    rsa::sign_with_rng(key, msg, scheme, hash, &mut DefaultRand::default())
}

pub fn verify(
    key: &PublicKey,
    msg: &[u8],
    signature: &[u8],
    scheme: &SignatureScheme,
    hash: HashAlgorithm,
) -> bool {
    rsa::verify(key, msg, signature, scheme, hash)
}

/// Encrypts a message of any length block by block, each block carrying at most
/// `key.max_message_len(scheme)` bytes; the result is a multiple of `key.size()` bytes.
pub fn encrypt_chunked(
    key: &PublicKey,
    plaintext: &[u8],
    scheme: &EncryptionScheme,
) -> Result<Vec<u8>, CipherError> {
    let max = key.max_message_len(scheme);
    if plaintext.is_empty() || max == 0 {
        return encrypt(key, plaintext, scheme);
    }

    let mut rng = DefaultRand::default();
    let mut ciphertext = Vec::with_capacity(plaintext.len().div_ceil(max) * key.size());
    for block in plaintext.chunks(max) {
        ciphertext.extend(rsa::encrypt_with_rng(key, block, scheme, &mut rng)?);
    }

    Ok(ciphertext)
}

/// Inverse of [`encrypt_chunked`]; the input must be a non-empty multiple of `k` bytes.
pub fn decrypt_chunked(
    key: &PrivateKey,
    ciphertext: &[u8],
    scheme: &EncryptionScheme,
) -> Result<Vec<u8>, CipherError> {
    let k = key.public_key().size();
    if ciphertext.is_empty() || ciphertext.len() % k != 0 {
        return Err(CipherError::CiphertextLength {
            len: ciphertext.len(),
            expected: ciphertext.len().div_ceil(k).max(1) * k,
        });
    }

    let mut rng = DefaultRand::default();
    let mut plaintext = Vec::with_capacity(ciphertext.len());
    for block in ciphertext.chunks(k) {
        plaintext.extend(rsa::decrypt_with_rng(key, block, scheme, &mut rng)?);
    }

    Ok(plaintext)
}
