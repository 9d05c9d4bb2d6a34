//! = RFC 8017
//!
//! == PKCS #1: RSA Cryptography Specification Version 2.2
//!
//! === RSAES-PKCS1-v1_5
//!
//! EM = 0x00 || 0x02 || PS || 0x00 || M, PS非零随机字节, 长度至少8字节
//!

use crate::rsa::{PrivateKey, PublicKey, SecretBytes};
use crate::{CipherError, Decrypt, Encrypt, Rand};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, ConstantTimeGreater};

/// 0x00 || 0x02 || PS(>= 8) || 0x00
pub(crate) const PKCS1_OVERHEAD: usize = 11;

#[derive(Clone, Copy, Debug)]
pub struct PKCS1Encrypt<'k> {
    key: &'k PublicKey,
}

#[derive(Clone, Copy, Debug)]
pub struct PKCS1Decrypt<'k> {
    key: &'k PrivateKey,
}

impl<'k> PKCS1Encrypt<'k> {
    pub fn new(key: &'k PublicKey) -> Self {
        Self { key }
    }

    pub fn key_len(&self) -> usize {
        self.key.size()
    }

    pub fn max_msg_len(&self) -> usize {
        self.key_len().saturating_sub(PKCS1_OVERHEAD)
    }
}

impl<'k> PKCS1Decrypt<'k> {
    pub fn new(key: &'k PrivateKey) -> Self {
        Self { key }
    }

    pub fn key_len(&self) -> usize {
        self.key.public_key().size()
    }

    pub fn max_msg_len(&self) -> usize {
        self.key_len().saturating_sub(PKCS1_OVERHEAD)
    }
}

impl<'k> From<PKCS1Decrypt<'k>> for PKCS1Encrypt<'k> {
    fn from(value: PKCS1Decrypt<'k>) -> Self {
        Self::new(value.key.public_key())
    }
}

fn check_key_len(key: &PublicKey) -> Result<(), CipherError> {
    if key.size() < PKCS1_OVERHEAD {
        Err(CipherError::KeyTooSmall {
            bits: key.bits(),
            min: PKCS1_OVERHEAD << 3,
        })
    } else {
        Ok(())
    }
}

impl Encrypt for PKCS1Encrypt<'_> {
    fn encrypt<R: Rand + ?Sized>(
        &self,
        plaintext: &[u8],
        ciphertext: &mut Vec<u8>,
        rng: &mut R,
    ) -> Result<(), CipherError> {
        check_key_len(self.key)?;
        let (klen, max) = (self.key_len(), self.max_msg_len());
        if plaintext.len() > max {
            return Err(CipherError::PlaintextTooLarge {
                len: plaintext.len(),
                max,
            });
        }

        let mut em: SecretBytes = vec![0u8; klen].into();
        em[1] = 2;
        let sep = klen - plaintext.len() - 1;
        rng.rand_nonzero(&mut em[2..sep]);
        em[(sep + 1)..].copy_from_slice(plaintext);

        ciphertext.extend(self.key.encrypt_raw(&em)?);
        Ok(())
    }
}

impl Encrypt for PKCS1Decrypt<'_> {
    fn encrypt<R: Rand + ?Sized>(
        &self,
        plaintext: &[u8],
        ciphertext: &mut Vec<u8>,
        rng: &mut R,
    ) -> Result<(), CipherError> {
        PKCS1Encrypt::from(*self).encrypt(plaintext, ciphertext, rng)
    }
}

impl Decrypt for PKCS1Decrypt<'_> {
    fn decrypt<R: Rand + ?Sized>(
        &self,
        ciphertext: &[u8],
        plaintext: &mut Vec<u8>,
        rng: &mut R,
    ) -> Result<(), CipherError> {
        check_key_len(self.key.public_key())?;
        let em = self.key.decrypt_raw(ciphertext, rng)?;

        let (valid, idx) = eme_pkcs1_decode(&em);
        if bool::from(valid) {
            plaintext.extend_from_slice(&em[idx..]);
            Ok(())
        } else {
            Err(CipherError::Decryption)
        }
    }
}

/// (valid, message start)
///
/// Every byte of `em` is read whatever its content, `em.len() >= 11`.
fn eme_pkcs1_decode(em: &[u8]) -> (Choice, usize) {
    let first = em[0].ct_eq(&0);
    let second = em[1].ct_eq(&2);

    let (mut looking, mut idx) = (Choice::from(1u8), 0u32);
    for (i, &b) in em.iter().enumerate().skip(2) {
        let is_zero = b.ct_eq(&0);
        idx.conditional_assign(&(i as u32), looking & is_zero);
        looking &= !is_zero;
    }

    // PS至少8字节: idx >= 2 + 8
    let valid = first & second & !looking & idx.ct_gt(&9);
    (valid, idx as usize + 1)
}
