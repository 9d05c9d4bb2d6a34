use std::sync::OnceLock;

use cipher::rsa::{
    EncryptionScheme, KeyEncoding, KeyFormat, KeyGenParams, KeyPolicy, KeySyntax, SaltLength,
    SignatureScheme, MIN_PRIME_TEST_ROUNDS,
};
use cipher::HashAlgorithm;
use config::{Config, ConfigError};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptionKind {
    Pkcs1,
    #[default]
    Oaep,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningKind {
    #[default]
    Pkcs1,
    Pss,
}

/// Layered options: defaults, then an optional JSON/JSON5 file, then `RSAKIT__*` variables,
/// e.g. `RSAKIT__SIGNING_HASH=sha512`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct RsaConfig {
    pub encryption: EncryptionKind,

    /// hash of OAEP and of its MGF1
    pub oaep_hash: HashAlgorithm,

    pub signing: SigningKind,

    pub signing_hash: HashAlgorithm,

    pub pss_salt: SaltLength,

    // export format
    pub key_syntax: KeySyntax,
    pub key_encoding: KeyEncoding,

    /// parsed and generated keys below this are rejected
    pub min_modulus_bits: usize,

    pub public_exponent: u64,

    pub prime_test_rounds: usize,

    pub candidates_per_bit: usize,
}

impl Default for RsaConfig {
    fn default() -> Self {
        Self {
            encryption: EncryptionKind::Oaep,
            oaep_hash: HashAlgorithm::Sha1,
            signing: SigningKind::Pkcs1,
            signing_hash: HashAlgorithm::Sha256,
            pss_salt: SaltLength::HashLength,
            key_syntax: KeySyntax::Pkcs1,
            key_encoding: KeyEncoding::Pem,
            min_modulus_bits: 1024,
            public_exponent: 65537,
            prime_test_rounds: MIN_PRIME_TEST_ROUNDS,
            candidates_per_bit: 20,
        }
    }
}

impl RsaConfig {
    /// process-wide options: defaults overridden by the environment, read once
    pub fn global() -> &'static Self {
        static CONFIG: OnceLock<RsaConfig> = OnceLock::new();

        CONFIG.get_or_init(|| {
            Self::load(None).unwrap_or_else(|e| {
                warn!("rsakit: invalid configuration, using defaults: {e}");
                Self::default()
            })
        })
    }

    /// `f`: optional config file, its extension picks the format
    pub fn load(f: Option<&str>) -> Result<Self, ConfigError> {
        let default_config = Config::try_from(&RsaConfig::default())?;

        let mut config = Config::builder().add_source(default_config);

        if let Some(f) = f {
            debug!("rsakit: loading config file `{f}`");
            config = config.add_source(config::File::with_name(f).required(false));
        }

        config = config.add_source(
            config::Environment::with_prefix("RSAKIT")
                .try_parsing(true)
                .separator("__"),
        );

        let mut rsa_config: RsaConfig = config.build()?.try_deserialize()?;
        rsa_config.sanitize();

        trace!("{:?}", rsa_config);

        Ok(rsa_config)
    }

    fn sanitize(&mut self) {
        if self.prime_test_rounds < MIN_PRIME_TEST_ROUNDS {
            warn!(
                "rsakit: prime_test_rounds {} raised to {}",
                self.prime_test_rounds, MIN_PRIME_TEST_ROUNDS
            );
            self.prime_test_rounds = MIN_PRIME_TEST_ROUNDS;
        }

        if self.candidates_per_bit == 0 {
            warn!("rsakit: candidates_per_bit 0 raised to 1");
            self.candidates_per_bit = 1;
        }
    }

    pub fn encryption_scheme(&self) -> EncryptionScheme {
        match self.encryption {
            EncryptionKind::Pkcs1 => EncryptionScheme::Pkcs1v15,
            EncryptionKind::Oaep => EncryptionScheme::oaep(self.oaep_hash),
        }
    }

    pub fn signature_scheme(&self) -> SignatureScheme {
        match self.signing {
            SigningKind::Pkcs1 => SignatureScheme::Pkcs1v15,
            SigningKind::Pss => SignatureScheme::Pss {
                salt: self.pss_salt,
            },
        }
    }

    pub fn key_format(&self) -> KeyFormat {
        KeyFormat::new(self.key_syntax, self.key_encoding)
    }

    pub fn key_policy(&self) -> KeyPolicy {
        KeyPolicy {
            min_modulus_bits: self.min_modulus_bits,
        }
    }

    pub fn keygen_params(&self, bits: usize) -> KeyGenParams {
        KeyGenParams {
            bits,
            public_exponent: self.public_exponent,
            prime_test_rounds: self.prime_test_rounds,
            candidates_per_bit: self.candidates_per_bit,
            min_bits: self.min_modulus_bits,
        }
    }
}
