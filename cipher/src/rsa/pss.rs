//! = RFC 8017
//!
//! == PKCS #1: RSA Cryptography Specification Version 2.2
//!
//! === PSS(Probabilistic Signature Scheme)
//!
//! - emBits = modBits - 1, emLen = ceil(emBits / 8);
//! - M' = 0x00 * 8 || Hash(M) || salt, H = Hash(M');
//! - DB = PS || 0x01 || salt;
//! - EM = (DB ^ MGF1(H)) || H || 0xbc, 最高的`8 * emLen - emBits`位置零;
//!

use crate::rsa::mgf::mgf1_xor;
use crate::rsa::{PrivateKey, PublicKey, SecretBytes};
use crate::{CipherError, HashAlgorithm, Rand, Sign, Verify};
use serde::{Deserialize, Serialize};
use subtle::{Choice, ConstantTimeEq};

/// length of the PSS salt
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaltLength {
    /// the digest length
    #[default]
    HashLength,
    /// the largest salt the modulus can hold, `emLen - hLen - 2`
    Maximum,
    Fixed(usize),
}

impl SaltLength {
    pub fn resolve(&self, em_len: usize, hash: HashAlgorithm) -> usize {
        match self {
            SaltLength::HashLength => hash.output_len(),
            SaltLength::Maximum => em_len.saturating_sub(hash.output_len() + 2),
            SaltLength::Fixed(n) => *n,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PSSVerify<'k> {
    key: &'k PublicKey,
    hash: HashAlgorithm,
    salt: SaltLength,
}

#[derive(Clone, Copy, Debug)]
pub struct PSSSign<'k> {
    key: &'k PrivateKey,
    hash: HashAlgorithm,
    salt: SaltLength,
}

impl<'k> PSSVerify<'k> {
    pub fn new(key: &'k PublicKey, hash: HashAlgorithm, salt: SaltLength) -> Self {
        Self { key, hash, salt }
    }

    /// 编码消息的位数
    pub fn em_bits(&self) -> usize {
        self.key.bits().saturating_sub(1)
    }

    pub fn em_len(&self) -> usize {
        (self.em_bits() + 7) >> 3
    }

    pub fn salt_len(&self) -> usize {
        self.salt.resolve(self.em_len(), self.hash)
    }
}

impl<'k> PSSSign<'k> {
    pub fn new(key: &'k PrivateKey, hash: HashAlgorithm, salt: SaltLength) -> Self {
        Self { key, hash, salt }
    }

    fn verifier(&self) -> PSSVerify<'k> {
        PSSVerify::new(self.key.public_key(), self.hash, self.salt)
    }

    pub fn em_bits(&self) -> usize {
        self.verifier().em_bits()
    }

    pub fn em_len(&self) -> usize {
        self.verifier().em_len()
    }

    pub fn salt_len(&self) -> usize {
        self.verifier().salt_len()
    }
}

impl<'k> From<PSSSign<'k>> for PSSVerify<'k> {
    fn from(value: PSSSign<'k>) -> Self {
        value.verifier()
    }
}

fn m_prime_hash(hash: HashAlgorithm, msg: &[u8], salt: &[u8]) -> Vec<u8> {
    let m_hash = hash.digest(msg);
    hash.digest_parts(&[&[0u8; 8][..], m_hash.as_slice(), salt])
}

// emLen >= hLen + sLen + 2
fn check_fit(hlen: usize, slen: usize, em_bits: usize) -> Result<(), CipherError> {
    let em_len = (em_bits + 7) >> 3;
    match hlen.checked_add(slen).and_then(|x| x.checked_add(2)) {
        Some(need) if em_len >= need => Ok(()),
        // ceil((bits - 1) / 8) >= need
        Some(need) => Err(CipherError::KeyTooSmall {
            bits: em_bits + 1,
            min: need.saturating_mul(8).saturating_sub(6),
        }),
        None => Err(CipherError::InvalidParameter(format!("salt length {slen}"))),
    }
}

// em = maskedDB || H || 0xbc
pub(crate) fn emsa_pss_encode_with_salt(
    hash: HashAlgorithm,
    msg: &[u8],
    salt: &[u8],
    em_bits: usize,
) -> Result<Vec<u8>, CipherError> {
    let (hlen, slen, em_len) = (hash.output_len(), salt.len(), (em_bits + 7) >> 3);
    check_fit(hlen, slen, em_bits)?;

    let h = m_prime_hash(hash, msg, salt);

    let mut em = vec![0u8; em_len];
    let (db, tail) = em.split_at_mut(em_len - hlen - 1);
    // db = ps || 0x01 || salt
    let ps_len = db.len() - slen - 1;
    db[ps_len] = 0x01;
    db[(ps_len + 1)..].copy_from_slice(salt);
    mgf1_xor(db, hash, &h);
    db[0] &= 0xffu8 >> ((em_len << 3) - em_bits);

    tail[..hlen].copy_from_slice(&h);
    tail[hlen] = 0xbc;

    Ok(em)
}

pub(crate) fn emsa_pss_verify(
    hash: HashAlgorithm,
    msg: &[u8],
    em: &mut [u8],
    em_bits: usize,
    slen: usize,
) -> bool {
    let (hlen, em_len) = (hash.output_len(), (em_bits + 7) >> 3);
    let fits = hlen
        .checked_add(slen)
        .and_then(|x| x.checked_add(2))
        .is_some_and(|need| em_len >= need);
    if em.len() != em_len || !fits {
        return false;
    }

    let zero_bits = (em_len << 3) - em_bits;
    if em[em_len - 1] != 0xbc || em[0] & !(0xffu8 >> zero_bits) != 0 {
        return false;
    }

    let (db, tail) = em.split_at_mut(em_len - hlen - 1);
    let h = &tail[..hlen];
    mgf1_xor(db, hash, h);
    db[0] &= 0xffu8 >> zero_bits;

    let ps_len = db.len() - slen - 1;
    let ps_ok = db[..ps_len]
        .iter()
        .fold(Choice::from(1u8), |acc, b| acc & b.ct_eq(&0));
    let sep_ok = db[ps_len].ct_eq(&0x01);

    let h2 = m_prime_hash(hash, msg, &db[(ps_len + 1)..]);
    (ps_ok & sep_ok & h2.as_slice().ct_eq(h)).into()
}

impl Sign for PSSSign<'_> {
    fn sign<R: Rand + ?Sized>(
        &self,
        msg: &[u8],
        signature: &mut Vec<u8>,
        rng: &mut R,
    ) -> Result<(), CipherError> {
        let slen = self.salt_len();
        check_fit(self.hash.output_len(), slen, self.em_bits())?;

        let mut salt: SecretBytes = vec![0u8; slen].into();
        rng.rand(&mut salt);

        let em = emsa_pss_encode_with_salt(self.hash, msg, &salt, self.em_bits())?;
        signature.extend(self.key.sign_raw(&em, rng)?);
        Ok(())
    }
}

impl Verify for PSSVerify<'_> {
    fn verify(&self, msg: &[u8], signature: &[u8]) -> bool {
        let (klen, em_len) = (self.key.size(), self.em_len());
        let Some(mut m) = self.key.verify_raw(signature, klen) else {
            return false;
        };

        // modBits = 8 * (k - 1) + 1 时, emLen = k - 1, 首字节必须为0
        let em = if klen > em_len {
            if m[0] != 0 {
                return false;
            }
            &mut m[1..]
        } else {
            &mut m[..]
        };

        emsa_pss_verify(self.hash, msg, em, self.em_bits(), self.salt_len())
    }
}

impl Verify for PSSSign<'_> {
    fn verify(&self, msg: &[u8], signature: &[u8]) -> bool {
        self.verifier().verify(msg, signature)
    }
}
