use crate::{decrypt_chunked, encrypt_chunked, RsaConfig};
use cipher::rsa::{self, Key, KeyFormat, PrivateKey};
use cipher::{CipherError, DefaultRand};
use log::debug;

/// A key bundled with the options its operations use.
///
/// `encrypt`/`decrypt` accept messages of any length (see [`crate::encrypt_chunked`]).
#[derive(Clone, Debug)]
pub struct Rsa {
    key: Key,
    config: RsaConfig,
}

impl Rsa {
    /// Parses `data` with the process-wide options.
    pub fn new(data: &[u8], format: KeyFormat) -> Result<Self, CipherError> {
        Self::with_config(data, format, RsaConfig::global().clone())
    }

    pub fn with_config(
        data: &[u8],
        format: KeyFormat,
        config: RsaConfig,
    ) -> Result<Self, CipherError> {
        let key = Key::parse(data, format, &config.key_policy())?;
        Ok(Self { key, config })
    }

    pub fn from_key<K: Into<Key>>(key: K, config: RsaConfig) -> Self {
        Self {
            key: key.into(),
            config,
        }
    }

    /// Generates a fresh private key of `bits` bits.
    pub fn generate(bits: usize) -> Result<Self, CipherError> {
        Self::generate_with_config(bits, RsaConfig::global().clone())
    }

    pub fn generate_with_config(bits: usize, config: RsaConfig) -> Result<Self, CipherError> {
        let key = rsa::generate_key(&config.keygen_params(bits))?;
        debug!("rsakit: handle holds a new {bits}-bit key");
        Ok(Self::from_key(key, config))
    }

    pub fn set_config(&mut self, config: RsaConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &RsaConfig {
        &self.config
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn is_private(&self) -> bool {
        self.key.is_private()
    }

    /// modulus bits
    pub fn key_size(&self) -> usize {
        self.key.public_key().bits()
    }

    /// plaintext bytes one block of the configured encryption scheme holds
    pub fn max_message_len(&self) -> usize {
        self.key
            .public_key()
            .max_message_len(&self.config.encryption_scheme())
    }

    fn private_key(&self) -> Result<&PrivateKey, CipherError> {
        self.key.private_key().ok_or(CipherError::MissingPrivateKey)
    }

    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        encrypt_chunked(
            self.key.public_key(),
            data,
            &self.config.encryption_scheme(),
        )
    }

    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        decrypt_chunked(
            self.private_key()?,
            data,
            &self.config.encryption_scheme(),
        )
    }

    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        rsa::sign_with_rng(
            self.private_key()?,
            data,
            &self.config.signature_scheme(),
            self.config.signing_hash,
            &mut DefaultRand::default(),
        )
    }

    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        rsa::verify(
            self.key.public_key(),
            data,
            signature,
            &self.config.signature_scheme(),
            self.config.signing_hash,
        )
    }

    /// Serializes the held key, a private handle exports its private key.
    pub fn export(&self, format: KeyFormat) -> Result<Vec<u8>, CipherError> {
        self.key.serialize(format)
    }

    /// export in the configured format
    pub fn export_default(&self) -> Result<Vec<u8>, CipherError> {
        self.export(self.config.key_format())
    }

    pub fn export_public(&self, format: KeyFormat) -> Result<Vec<u8>, CipherError> {
        Key::Public(self.key.public_key().clone()).serialize(format)
    }
}
