use encode::EncodeError;
use thiserror::Error;
use utils::ArithmeticError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// malformed or inconsistent key document
    #[error("rsa: invalid key: {0}")]
    KeyFormat(String),

    #[error("rsa: modulus of {bits} bits is below the required {min} bits")]
    KeyTooSmall { bits: usize, min: usize },

    #[error("rsa: message of {len} bytes exceeds the limit of {max} bytes")]
    PlaintextTooLarge { len: usize, max: usize },

    #[error("rsa: ciphertext of {len} bytes, expected {expected}")]
    CiphertextLength { len: usize, expected: usize },

    /// carries no detail on purpose, every decoding failure looks the same
    #[error("rsa: decryption error")]
    Decryption,

    #[error("rsa: no prime found within {attempts} candidates")]
    GenerationTimeout { attempts: usize },

    #[error("rsa: {0}")]
    Arithmetic(#[from] ArithmeticError),

    #[error("rsa: invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("rsa: operation requires a private key")]
    MissingPrivateKey,
}

impl From<EncodeError> for CipherError {
    fn from(value: EncodeError) -> Self {
        CipherError::KeyFormat(value.to_string())
    }
}
