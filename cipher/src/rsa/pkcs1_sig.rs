//! = RFC 8017
//!
//! == PKCS #1: RSA Cryptography Specification Version 2.2
//!
//! === RSASSA-PKCS1-v1_5
//!
//! EM = 0x00 || 0x01 || PS(0xff...) || 0x00 || DigestInfo
//!

use crate::rsa::{PrivateKey, PublicKey};
use crate::{CipherError, HashAlgorithm, Rand, Sign, Verify};
use subtle::ConstantTimeEq;

#[derive(Clone, Copy, Debug)]
pub struct PKCS1Verify<'k> {
    key: &'k PublicKey,
    hash: HashAlgorithm,
}

#[derive(Clone, Copy, Debug)]
pub struct PKCS1Sign<'k> {
    key: &'k PrivateKey,
    hash: HashAlgorithm,
}

impl<'k> PKCS1Verify<'k> {
    pub fn new(key: &'k PublicKey, hash: HashAlgorithm) -> Self {
        Self { key, hash }
    }
}

impl<'k> PKCS1Sign<'k> {
    pub fn new(key: &'k PrivateKey, hash: HashAlgorithm) -> Self {
        Self { key, hash }
    }
}

impl<'k> From<PKCS1Sign<'k>> for PKCS1Verify<'k> {
    fn from(value: PKCS1Sign<'k>) -> Self {
        Self::new(value.key.public_key(), value.hash)
    }
}

/// EMSA-PKCS1-v1_5 encoding of `msg` into `key.size()` bytes
fn emsa_pkcs1_encode(
    key: &PublicKey,
    hash: HashAlgorithm,
    msg: &[u8],
) -> Result<Vec<u8>, CipherError> {
    let (klen, prefix) = (key.size(), hash.digest_info_prefix());
    let tlen = prefix.len() + hash.output_len();
    // PS至少8字节
    if klen < tlen + 11 {
        return Err(CipherError::KeyTooSmall {
            bits: key.bits(),
            min: (tlen + 11) << 3,
        });
    }

    let mut em = vec![0xffu8; klen];
    em[0] = 0;
    em[1] = 1;
    let t = klen - tlen;
    em[t - 1] = 0;
    em[t..(t + prefix.len())].copy_from_slice(prefix);
    em[(t + prefix.len())..].copy_from_slice(&hash.digest(msg));

    Ok(em)
}

impl Sign for PKCS1Sign<'_> {
    fn sign<R: Rand + ?Sized>(
        &self,
        msg: &[u8],
        signature: &mut Vec<u8>,
        rng: &mut R,
    ) -> Result<(), CipherError> {
        let em = emsa_pkcs1_encode(self.key.public_key(), self.hash, msg)?;
        signature.extend(self.key.sign_raw(&em, rng)?);
        Ok(())
    }
}

impl Verify for PKCS1Verify<'_> {
    fn verify(&self, msg: &[u8], signature: &[u8]) -> bool {
        let Ok(expected) = emsa_pkcs1_encode(self.key, self.hash, msg) else {
            return false;
        };

        match self.key.verify_raw(signature, expected.len()) {
            Some(em) => em.ct_eq(&expected).into(),
            None => false,
        }
    }
}

impl Verify for PKCS1Sign<'_> {
    fn verify(&self, msg: &[u8], signature: &[u8]) -> bool {
        PKCS1Verify::from(*self).verify(msg, signature)
    }
}
