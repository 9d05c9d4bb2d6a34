mod error;
pub use error::CipherError;

pub use rand::{DefaultRand, Rand};

mod hash;
pub use hash::HashAlgorithm;

pub mod rsa;

pub trait Encrypt {
    // 写入ciphertext之前不清空
    fn encrypt<R: Rand + ?Sized>(
        &self,
        plaintext: &[u8],
        ciphertext: &mut Vec<u8>,
        rng: &mut R,
    ) -> Result<(), CipherError>;
}

pub trait Decrypt {
    // 写入plaintext之前不清空
    // `rng` only feeds the blinding factor, the result does not depend on it
    fn decrypt<R: Rand + ?Sized>(
        &self,
        ciphertext: &[u8],
        plaintext: &mut Vec<u8>,
        rng: &mut R,
    ) -> Result<(), CipherError>;
}

pub trait Sign {
    fn sign<R: Rand + ?Sized>(
        &self,
        msg: &[u8],
        signature: &mut Vec<u8>,
        rng: &mut R,
    ) -> Result<(), CipherError>;
}

/// A failed check is `false`, never an error.
pub trait Verify {
    fn verify(&self, msg: &[u8], signature: &[u8]) -> bool;
}
