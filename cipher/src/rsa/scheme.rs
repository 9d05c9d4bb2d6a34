use crate::rsa::{
    OAEPDecrypt, OAEPEncrypt, PKCS1Decrypt, PKCS1Encrypt, PKCS1Sign, PKCS1Verify, PSSSign,
    PSSVerify, PrivateKey, PublicKey, SaltLength,
};
use crate::{CipherError, Decrypt, Encrypt, HashAlgorithm, Rand, Sign, Verify};
use log::trace;

/// Padding used by [`encrypt_with_rng`] and [`decrypt_with_rng`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EncryptionScheme {
    /// RSAES-PKCS1-v1_5
    Pkcs1v15,
    /// RSAES-OAEP with MGF1 over `hash`
    Oaep { hash: HashAlgorithm, label: Vec<u8> },
}

impl Default for EncryptionScheme {
    /// OAEP, SHA-1, empty label
    fn default() -> Self {
        Self::oaep(HashAlgorithm::Sha1)
    }
}

impl EncryptionScheme {
    pub fn oaep(hash: HashAlgorithm) -> Self {
        EncryptionScheme::Oaep {
            hash,
            label: Vec::new(),
        }
    }

    /// bytes of the modulus taken by the padding
    pub fn overhead(&self) -> usize {
        match self {
            EncryptionScheme::Pkcs1v15 => crate::rsa::pkcs1::PKCS1_OVERHEAD,
            EncryptionScheme::Oaep { hash, .. } => (hash.output_len() << 1) + 2,
        }
    }
}

/// Padding used by [`sign_with_rng`] and [`verify`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    /// RSASSA-PKCS1-v1_5
    #[default]
    Pkcs1v15,
    /// RSASSA-PSS with MGF1 over the signing hash
    Pss { salt: SaltLength },
}

impl PublicKey {
    /// the longest plaintext a single block of `scheme` carries
    pub fn max_message_len(&self, scheme: &EncryptionScheme) -> usize {
        self.size().saturating_sub(scheme.overhead())
    }
}

/// `k`-byte ciphertext of `plaintext`
pub fn encrypt_with_rng<R: Rand + ?Sized>(
    key: &PublicKey,
    plaintext: &[u8],
    scheme: &EncryptionScheme,
    rng: &mut R,
) -> Result<Vec<u8>, CipherError> {
    trace!("rsa: encrypt {} bytes, {:?}", plaintext.len(), scheme);

    let mut ciphertext = Vec::with_capacity(key.size());
    match scheme {
        EncryptionScheme::Pkcs1v15 => {
            PKCS1Encrypt::new(key).encrypt(plaintext, &mut ciphertext, rng)?
        }
        EncryptionScheme::Oaep { hash, label } => {
            OAEPEncrypt::new(key, *hash, label).encrypt(plaintext, &mut ciphertext, rng)?
        }
    }

    Ok(ciphertext)
}

/// `rng` feeds the blinding factor only
pub fn decrypt_with_rng<R: Rand + ?Sized>(
    key: &PrivateKey,
    ciphertext: &[u8],
    scheme: &EncryptionScheme,
    rng: &mut R,
) -> Result<Vec<u8>, CipherError> {
    let mut plaintext = Vec::with_capacity(key.public_key().size());
    match scheme {
        EncryptionScheme::Pkcs1v15 => {
            PKCS1Decrypt::new(key).decrypt(ciphertext, &mut plaintext, rng)?
        }
        EncryptionScheme::Oaep { hash, label } => {
            OAEPDecrypt::new(key, *hash, label).decrypt(ciphertext, &mut plaintext, rng)?
        }
    }

    Ok(plaintext)
}

pub fn sign_with_rng<R: Rand + ?Sized>(
    key: &PrivateKey,
    msg: &[u8],
    scheme: &SignatureScheme,
    hash: HashAlgorithm,
    rng: &mut R,
) -> Result<Vec<u8>, CipherError> {
    trace!("rsa: sign {} bytes, {:?} {}", msg.len(), scheme, hash);

    let mut signature = Vec::with_capacity(key.public_key().size());
    match scheme {
        SignatureScheme::Pkcs1v15 => PKCS1Sign::new(key, hash).sign(msg, &mut signature, rng)?,
        SignatureScheme::Pss { salt } => {
            PSSSign::new(key, hash, *salt).sign(msg, &mut signature, rng)?
        }
    }

    Ok(signature)
}

/// `false` for a signature of the wrong length, out of range or not matching `msg`
pub fn verify(
    key: &PublicKey,
    msg: &[u8],
    signature: &[u8],
    scheme: &SignatureScheme,
    hash: HashAlgorithm,
) -> bool {
    match scheme {
        SignatureScheme::Pkcs1v15 => PKCS1Verify::new(key, hash).verify(msg, signature),
        SignatureScheme::Pss { salt } => PSSVerify::new(key, hash, *salt).verify(msg, signature),
    }
}
