//! = RFC 8017
//!
//! == PKCS #1: RSA Cryptography Specification Version 2.2
//!
//! === OAEP(Optimal Asymmetric Encryption Padding)
//!

use crate::rsa::mgf::mgf1_xor;
use crate::rsa::{PrivateKey, PublicKey, SecretBytes};
use crate::{CipherError, Decrypt, Encrypt, HashAlgorithm, Rand};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Optimal Asymmetric Encryption Padding
#[derive(Clone, Debug)]
pub struct OAEPEncrypt<'a> {
    key: &'a PublicKey,
    hash: HashAlgorithm,
    label: &'a [u8],
}

#[derive(Clone, Debug)]
pub struct OAEPDecrypt<'a> {
    key: &'a PrivateKey,
    hash: HashAlgorithm,
    label: &'a [u8],
}

impl<'a> OAEPEncrypt<'a> {
    /// label: 和消息相关联的标签
    pub fn new(key: &'a PublicKey, hash: HashAlgorithm, label: &'a [u8]) -> Self {
        Self { key, hash, label }
    }

    pub fn key_len(&self) -> usize {
        self.key.size()
    }

    pub fn hash_len(&self) -> usize {
        self.hash.output_len()
    }

    pub fn max_msg_len(&self) -> usize {
        self.key_len().saturating_sub((self.hash_len() << 1) + 2)
    }

    fn check_key_len(&self) -> Result<(), CipherError> {
        let min = (self.hash_len() << 1) + 2;
        if self.key_len() < min {
            Err(CipherError::KeyTooSmall {
                bits: self.key.bits(),
                min: min << 3,
            })
        } else {
            Ok(())
        }
    }
}

impl<'a> OAEPDecrypt<'a> {
    pub fn new(key: &'a PrivateKey, hash: HashAlgorithm, label: &'a [u8]) -> Self {
        Self { key, hash, label }
    }

    fn encryptor(&self) -> OAEPEncrypt<'a> {
        OAEPEncrypt::new(self.key.public_key(), self.hash, self.label)
    }

    pub fn key_len(&self) -> usize {
        self.encryptor().key_len()
    }

    pub fn max_msg_len(&self) -> usize {
        self.encryptor().max_msg_len()
    }
}

impl Encrypt for OAEPEncrypt<'_> {
    fn encrypt<R: Rand + ?Sized>(
        &self,
        plaintext: &[u8],
        ciphertext: &mut Vec<u8>,
        rng: &mut R,
    ) -> Result<(), CipherError> {
        self.check_key_len()?;
        let (klen, hlen, max) = (self.key_len(), self.hash_len(), self.max_msg_len());
        if plaintext.len() > max {
            return Err(CipherError::PlaintextTooLarge {
                len: plaintext.len(),
                max,
            });
        }

        // em = 0x00 || masked seed || masked db(data block)
        let mut em: SecretBytes = vec![0u8; klen].into();
        let (seed, db) = em[1..].split_at_mut(hlen);
        rng.rand(seed);

        // db = lhash || ps || 0x01 || M
        db[..hlen].copy_from_slice(&self.hash.digest(self.label));
        let msg_start = db.len() - plaintext.len();
        db[msg_start - 1] = 0x01;
        db[msg_start..].copy_from_slice(plaintext);

        mgf1_xor(db, self.hash, seed);
        mgf1_xor(seed, self.hash, db);

        ciphertext.extend(self.key.encrypt_raw(&em)?);
        Ok(())
    }
}

impl Encrypt for OAEPDecrypt<'_> {
    fn encrypt<R: Rand + ?Sized>(
        &self,
        plaintext: &[u8],
        ciphertext: &mut Vec<u8>,
        rng: &mut R,
    ) -> Result<(), CipherError> {
        self.encryptor().encrypt(plaintext, ciphertext, rng)
    }
}

impl Decrypt for OAEPDecrypt<'_> {
    fn decrypt<R: Rand + ?Sized>(
        &self,
        ciphertext: &[u8],
        plaintext: &mut Vec<u8>,
        rng: &mut R,
    ) -> Result<(), CipherError> {
        self.encryptor().check_key_len()?;
        let hlen = self.hash.output_len();

        let mut em = self.key.decrypt_raw(ciphertext, rng)?;
        let lhash = self.hash.digest(self.label);

        let first = em[0].ct_eq(&0);
        let (seed, db) = em[1..].split_at_mut(hlen);
        mgf1_xor(seed, self.hash, db);
        mgf1_xor(db, self.hash, seed);

        let lhash_ok = db[..hlen].ct_eq(lhash.as_slice());

        // db[hlen..] = ps(0x00...) || 0x01 || M
        let (mut looking, mut idx, mut invalid) = (Choice::from(1u8), 0u32, Choice::from(0u8));
        for (i, &b) in db.iter().enumerate().skip(hlen) {
            let (is_zero, is_one) = (b.ct_eq(&0), b.ct_eq(&1));
            idx.conditional_assign(&(i as u32), looking & is_one);
            invalid |= looking & !is_zero & !is_one;
            looking &= !is_one;
        }

        let valid = first & lhash_ok & !invalid & !looking;
        if bool::from(valid) {
            plaintext.extend_from_slice(&db[(idx as usize + 1)..]);
            Ok(())
        } else {
            Err(CipherError::Decryption)
        }
    }
}
