//! RSA key documents
//!
//! - PKCS#1: `RSAPrivateKey`, `RSAPublicKey`, RFC 8017 §A.1;
//! - PKCS#8: `PrivateKeyInfo`, RFC 5208; X.509 `SubjectPublicKeyInfo`, RFC 5280 §4.1;
//! - DER或PEM(RFC 7468), 以及十六进制的JSON分量;
//!

use crate::rsa::{PrivateKey, PublicKey, SecretBytes};
use crate::CipherError;
use encode::der::{oid_to_string, DerReader, DerWriter, Tag};
use encode::pem::{Label, Pem};
use log::trace;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// rsaEncryption, 1.2.840.113549.1.1.1
const RSA_ENCRYPTION_OID: [u8; 9] = [0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySyntax {
    /// `RSAPrivateKey` / `RSAPublicKey`
    #[default]
    Pkcs1,
    /// `PrivateKeyInfo` / `SubjectPublicKeyInfo`
    Pkcs8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEncoding {
    Der,
    #[default]
    Pem,
    /// JSON object of hex strings
    Components,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyFormat {
    pub syntax: KeySyntax,
    /// ignored by [`KeyEncoding::Components`]; when parsing PEM the label decides
    pub encoding: KeyEncoding,
}

impl KeyFormat {
    pub const PKCS1_DER: KeyFormat = KeyFormat::new(KeySyntax::Pkcs1, KeyEncoding::Der);
    pub const PKCS1_PEM: KeyFormat = KeyFormat::new(KeySyntax::Pkcs1, KeyEncoding::Pem);
    pub const PKCS8_DER: KeyFormat = KeyFormat::new(KeySyntax::Pkcs8, KeyEncoding::Der);
    pub const PKCS8_PEM: KeyFormat = KeyFormat::new(KeySyntax::Pkcs8, KeyEncoding::Pem);
    pub const COMPONENTS: KeyFormat = KeyFormat::new(KeySyntax::Pkcs1, KeyEncoding::Components);

    pub const fn new(syntax: KeySyntax, encoding: KeyEncoding) -> Self {
        Self { syntax, encoding }
    }
}

/// acceptance rules applied to parsed keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPolicy {
    pub min_modulus_bits: usize,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self {
            min_modulus_bits: 1024,
        }
    }
}

impl KeyPolicy {
    pub fn check(&self, key: &PublicKey) -> Result<(), CipherError> {
        key.check_size(self.min_modulus_bits)
    }
}

/// A key whose kind is only known once the document is read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Public(PublicKey),
    Private(PrivateKey),
}

impl From<PublicKey> for Key {
    fn from(value: PublicKey) -> Self {
        Key::Public(value)
    }
}

impl From<PrivateKey> for Key {
    fn from(value: PrivateKey) -> Self {
        Key::Private(value)
    }
}

impl Key {
    pub fn public_key(&self) -> &PublicKey {
        match self {
            Key::Public(k) => k,
            Key::Private(k) => k.public_key(),
        }
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        match self {
            Key::Public(_) => None,
            Key::Private(k) => Some(k),
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, Key::Private(_))
    }

    /// Reads a public or private key document, then applies `policy`.
    pub fn parse(data: &[u8], format: KeyFormat, policy: &KeyPolicy) -> Result<Key, CipherError> {
        let key = match format.encoding {
            KeyEncoding::Der => Self::from_der(data, format.syntax)?,
            KeyEncoding::Pem => Self::from_pem(as_text(data)?)?,
            KeyEncoding::Components => Self::from_components_json(as_text(data)?)?,
        };

        policy.check(key.public_key())?;
        Ok(key)
    }

    pub fn serialize(&self, format: KeyFormat) -> Result<Vec<u8>, CipherError> {
        match (self, format.encoding) {
            (Key::Public(k), KeyEncoding::Der) => Ok(k.to_der(format.syntax)),
            (Key::Private(k), KeyEncoding::Der) => Ok(k.to_der(format.syntax)),
            (Key::Public(k), KeyEncoding::Pem) => Ok(k.to_pem(format.syntax).into_bytes()),
            (Key::Private(k), KeyEncoding::Pem) => Ok(k.to_pem(format.syntax).into_bytes()),
            (Key::Public(k), KeyEncoding::Components) => k.to_components_json(),
            (Key::Private(k), KeyEncoding::Components) => k.to_components_json(),
        }
    }

    fn from_der(der: &[u8], syntax: KeySyntax) -> Result<Key, CipherError> {
        let is_public = match syntax {
            KeySyntax::Pkcs1 => count_elements(der)? == 2,
            KeySyntax::Pkcs8 => {
                let mut seq = DerReader::new(der).read_sequence()?;
                match seq.peek_tag() {
                    Some(Tag::Sequence) => true,
                    Some(Tag::Integer) => false,
                    _ => {
                        return Err(CipherError::KeyFormat(
                            "neither PrivateKeyInfo nor SubjectPublicKeyInfo".to_string(),
                        ))
                    }
                }
            }
        };
        trace!("rsa: {:?} DER holds a {} key", syntax, kind(is_public));

        if is_public {
            PublicKey::from_der(der, syntax).map(Key::Public)
        } else {
            PrivateKey::from_der(der, syntax).map(Key::Private)
        }
    }

    fn from_pem(pem: &str) -> Result<Key, CipherError> {
        let pem = Pem::from_str(pem)?;
        trace!("rsa: PEM label `{}`", pem.label());
        if pem.label().is_private() {
            PrivateKey::from_pem_block(&pem).map(Key::Private)
        } else {
            PublicKey::from_pem_block(&pem).map(Key::Public)
        }
    }

    fn from_components_json(json: &str) -> Result<Key, CipherError> {
        let c: Components = serde_json::from_str(json)
            .map_err(|e| CipherError::KeyFormat(format!("components: {e}")))?;
        if c.d.is_some() {
            c.into_private().map(Key::Private)
        } else {
            c.into_public().map(Key::Public)
        }
    }
}

fn kind(is_public: bool) -> &'static str {
    if is_public {
        "public"
    } else {
        "private"
    }
}

fn as_text(data: &[u8]) -> Result<&str, CipherError> {
    std::str::from_utf8(data).map_err(|_| CipherError::KeyFormat("not UTF-8 text".to_string()))
}

fn count_elements(der: &[u8]) -> Result<usize, CipherError> {
    let mut seq = DerReader::new(der).read_sequence()?;
    let mut n = 0;
    while !seq.is_empty() {
        seq.read_any()?;
        n += 1;
    }
    Ok(n)
}

fn read_int(r: &mut DerReader<'_>) -> Result<BigUint, CipherError> {
    Ok(BigUint::from_bytes_be(r.read_uint()?))
}

fn write_int(w: &mut DerWriter, x: &BigUint) {
    w.write_uint(&x.to_bytes_be());
}

// AlgorithmIdentifier { rsaEncryption, NULL }, absent parameters are accepted
fn read_algorithm(r: &mut DerReader<'_>) -> Result<(), CipherError> {
    let mut alg = r.read_sequence()?;
    let oid = alg.read_oid()?;
    if oid != RSA_ENCRYPTION_OID {
        return Err(CipherError::KeyFormat(format!(
            "unsupported algorithm {}",
            oid_to_string(oid)
        )));
    }
    if !alg.is_empty() {
        alg.read_null()?;
    }
    alg.finish()?;
    Ok(())
}

fn write_algorithm(w: &mut DerWriter) {
    w.write_sequence(|alg| {
        alg.write_oid(&RSA_ENCRYPTION_OID).write_null();
    });
}

fn key_kind_mismatch(expected: &str, label: Label) -> CipherError {
    CipherError::KeyFormat(format!("expected a {expected} key, found `{label}`"))
}

impl PublicKey {
    /// `RSAPublicKey ::= SEQUENCE { modulus, publicExponent }`
    fn from_pkcs1_der(der: &[u8]) -> Result<Self, CipherError> {
        let mut outer = DerReader::new(der);
        let mut seq = outer.read_sequence()?;
        let (n, e) = (read_int(&mut seq)?, read_int(&mut seq)?);
        seq.finish()?;
        outer.finish()?;

        Self::new(n, e)
    }

    fn to_pkcs1_der(&self) -> Vec<u8> {
        let mut w = DerWriter::new();
        w.write_sequence(|seq| {
            write_int(seq, self.modulus());
            write_int(seq, self.exponent());
        });
        w.finish()
    }

    /// `SubjectPublicKeyInfo ::= SEQUENCE { algorithm, subjectPublicKey BIT STRING }`
    fn from_spki_der(der: &[u8]) -> Result<Self, CipherError> {
        let mut outer = DerReader::new(der);
        let mut seq = outer.read_sequence()?;
        read_algorithm(&mut seq)?;
        let inner = seq.read_bit_string()?;
        seq.finish()?;
        outer.finish()?;

        Self::from_pkcs1_der(inner)
    }

    fn to_spki_der(&self) -> Vec<u8> {
        let inner = self.to_pkcs1_der();
        let mut w = DerWriter::new();
        w.write_sequence(|seq| {
            write_algorithm(seq);
            seq.write_bit_string(&inner);
        });
        w.finish()
    }

    /// `Pkcs8` stands for X.509 SubjectPublicKeyInfo
    pub fn from_der(der: &[u8], syntax: KeySyntax) -> Result<Self, CipherError> {
        match syntax {
            KeySyntax::Pkcs1 => Self::from_pkcs1_der(der),
            KeySyntax::Pkcs8 => Self::from_spki_der(der),
        }
    }

    pub fn to_der(&self, syntax: KeySyntax) -> Vec<u8> {
        match syntax {
            KeySyntax::Pkcs1 => self.to_pkcs1_der(),
            KeySyntax::Pkcs8 => self.to_spki_der(),
        }
    }

    /// `RSA PUBLIC KEY` or `PUBLIC KEY`, the label picks the syntax
    pub fn from_pem(pem: &str) -> Result<Self, CipherError> {
        Self::from_pem_block(&Pem::from_str(pem)?)
    }

    fn from_pem_block(pem: &Pem) -> Result<Self, CipherError> {
        match pem.label() {
            Label::RsaPublicKey => Self::from_pkcs1_der(pem.contents()),
            Label::PublicKey => Self::from_spki_der(pem.contents()),
            label => Err(key_kind_mismatch("public", label)),
        }
    }

    pub fn to_pem(&self, syntax: KeySyntax) -> String {
        let label = match syntax {
            KeySyntax::Pkcs1 => Label::RsaPublicKey,
            KeySyntax::Pkcs8 => Label::PublicKey,
        };
        Pem::new(label, self.to_der(syntax)).to_string()
    }

    fn to_components_json(&self) -> Result<Vec<u8>, CipherError> {
        to_json(&Components::public(self))
    }
}

impl PrivateKey {
    /// `RSAPrivateKey ::= SEQUENCE { version(0), n, e, d, p, q, dP, dQ, qInv }`
    fn from_pkcs1_der(der: &[u8]) -> Result<Self, CipherError> {
        let mut outer = DerReader::new(der);
        let mut seq = outer.read_sequence()?;
        let version = seq.read_u64()?;
        if version != 0 {
            // 1 is the multi-prime form
            return Err(CipherError::KeyFormat(format!(
                "unsupported RSAPrivateKey version {version}"
            )));
        }

        let mut ints = Vec::with_capacity(8);
        for _ in 0..8 {
            ints.push(read_int(&mut seq)?);
        }
        seq.finish()?;
        outer.finish()?;

        let mut ints = ints.into_iter();
        let mut next = || ints.next().unwrap_or_default();
        let (n, e, d, p, q) = (next(), next(), next(), next(), next());
        let (dp, dq, qinv) = (next(), next(), next());
        Self::from_crt_components(n, e, d, p, q, dp, dq, qinv)
    }

    fn to_pkcs1_der(&self) -> Vec<u8> {
        let pk = self.public_key();
        let ((p, q), (dp, dq)) = (self.primes(), self.crt_exponents());

        let mut w = DerWriter::new();
        w.write_sequence(|seq| {
            seq.write_u64(0);
            for x in [
                pk.modulus(),
                pk.exponent(),
                self.private_exponent(),
                p,
                q,
                dp,
                dq,
                self.crt_coefficient(),
            ] {
                write_int(seq, x);
            }
        });
        w.finish()
    }

    /// `PrivateKeyInfo ::= SEQUENCE { version(0), algorithm, privateKey OCTET STRING, [0] attributes OPTIONAL }`
    fn from_pkcs8_der(der: &[u8]) -> Result<Self, CipherError> {
        let mut outer = DerReader::new(der);
        let mut seq = outer.read_sequence()?;
        let version = seq.read_u64()?;
        if version != 0 {
            return Err(CipherError::KeyFormat(format!(
                "unsupported PrivateKeyInfo version {version}"
            )));
        }
        read_algorithm(&mut seq)?;
        let inner = seq.read_octet_string()?;
        if seq.peek_tag() == Some(Tag::Other(0xa0)) {
            seq.read_any()?;
        }
        seq.finish()?;
        outer.finish()?;

        Self::from_pkcs1_der(inner)
    }

    fn to_pkcs8_der(&self) -> Vec<u8> {
        let inner: SecretBytes = self.to_pkcs1_der().into();
        let mut w = DerWriter::new();
        w.write_sequence(|seq| {
            seq.write_u64(0);
            write_algorithm(seq);
            seq.write_octet_string(&inner);
        });
        w.finish()
    }

    pub fn from_der(der: &[u8], syntax: KeySyntax) -> Result<Self, CipherError> {
        match syntax {
            KeySyntax::Pkcs1 => Self::from_pkcs1_der(der),
            KeySyntax::Pkcs8 => Self::from_pkcs8_der(der),
        }
    }

    pub fn to_der(&self, syntax: KeySyntax) -> Vec<u8> {
        match syntax {
            KeySyntax::Pkcs1 => self.to_pkcs1_der(),
            KeySyntax::Pkcs8 => self.to_pkcs8_der(),
        }
    }

    /// `RSA PRIVATE KEY` or `PRIVATE KEY`, the label picks the syntax
    pub fn from_pem(pem: &str) -> Result<Self, CipherError> {
        Self::from_pem_block(&Pem::from_str(pem)?)
    }

    fn from_pem_block(pem: &Pem) -> Result<Self, CipherError> {
        match pem.label() {
            Label::RsaPrivateKey => Self::from_pkcs1_der(pem.contents()),
            Label::PrivateKey => Self::from_pkcs8_der(pem.contents()),
            label => Err(key_kind_mismatch("private", label)),
        }
    }

    pub fn to_pem(&self, syntax: KeySyntax) -> String {
        let label = match syntax {
            KeySyntax::Pkcs1 => Label::RsaPrivateKey,
            KeySyntax::Pkcs8 => Label::PrivateKey,
        };
        let der: SecretBytes = self.to_der(syntax).into();
        Pem::new(label, der.to_vec()).to_string()
    }

    fn to_components_json(&self) -> Result<Vec<u8>, CipherError> {
        to_json(&Components::private(self))
    }
}

/// `{ "n", "e", "d", "p", "q", "dmp1", "dmq1", "coeff" }`, lowercase big-endian hex
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Components {
    n: String,
    e: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    d: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    p: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dmp1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dmq1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coeff: Option<String>,
}

fn to_hex(x: &BigUint) -> String {
    hex::encode(x.to_bytes_be())
}

fn from_hex(name: &str, s: &str) -> Result<BigUint, CipherError> {
    let s = s.trim();
    let bytes = if s.len() & 1 == 1 {
        hex::decode(format!("0{s}"))
    } else {
        hex::decode(s)
    }
    .map_err(|e| CipherError::KeyFormat(format!("components: `{name}`: {e}")))?;

    if bytes.is_empty() {
        return Err(CipherError::KeyFormat(format!("components: `{name}` is empty")));
    }
    Ok(BigUint::from_bytes_be(&bytes))
}

fn required(name: &str, v: &Option<String>) -> Result<BigUint, CipherError> {
    match v {
        Some(s) => from_hex(name, s),
        None => Err(CipherError::KeyFormat(format!("components: missing `{name}`"))),
    }
}

fn to_json(c: &Components) -> Result<Vec<u8>, CipherError> {
    serde_json::to_vec_pretty(c).map_err(|e| CipherError::KeyFormat(format!("components: {e}")))
}

impl Components {
    fn public(key: &PublicKey) -> Self {
        Self {
            n: to_hex(key.modulus()),
            e: to_hex(key.exponent()),
            ..Default::default()
        }
    }

    fn private(key: &PrivateKey) -> Self {
        let ((p, q), (dp, dq)) = (key.primes(), key.crt_exponents());
        Self {
            d: Some(to_hex(key.private_exponent())),
            p: Some(to_hex(p)),
            q: Some(to_hex(q)),
            dmp1: Some(to_hex(dp)),
            dmq1: Some(to_hex(dq)),
            coeff: Some(to_hex(key.crt_coefficient())),
            ..Self::public(key.public_key())
        }
    }

    fn into_public(self) -> Result<PublicKey, CipherError> {
        PublicKey::new(from_hex("n", &self.n)?, from_hex("e", &self.e)?)
    }

    /// missing CRT values are derived, present ones must match
    fn into_private(self) -> Result<PrivateKey, CipherError> {
        let key = PrivateKey::from_components(
            from_hex("n", &self.n)?,
            from_hex("e", &self.e)?,
            required("d", &self.d)?,
            required("p", &self.p)?,
            required("q", &self.q)?,
        )?;

        let (dp, dq) = key.crt_exponents();
        for (name, given, derived) in [
            ("dmp1", &self.dmp1, dp),
            ("dmq1", &self.dmq1, dq),
            ("coeff", &self.coeff, key.crt_coefficient()),
        ] {
            if let Some(s) = given {
                if &from_hex(name, s)? != derived {
                    return Err(CipherError::KeyFormat(format!(
                        "components: inconsistent `{name}`"
                    )));
                }
            }
        }

        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::{Key, KeyEncoding, KeyFormat, KeyPolicy, KeySyntax};
    use crate::rsa::key::tests::key512;
    use crate::rsa::{PrivateKey, PublicKey};
    use crate::CipherError;

    const PKCS1_PEM: &str = include_str!("../../testdata/k1024_pkcs1.pem");
    const SPKI_PEM: &str = include_str!("../../testdata/k1024_spki.pem");

    fn all_formats() -> Vec<KeyFormat> {
        let mut v = vec![];
        for syntax in [KeySyntax::Pkcs1, KeySyntax::Pkcs8] {
            for encoding in [KeyEncoding::Der, KeyEncoding::Pem, KeyEncoding::Components] {
                v.push(KeyFormat::new(syntax, encoding));
            }
        }
        v
    }

    #[test]
    fn openssl_documents() {
        let key = PrivateKey::from_pem(PKCS1_PEM).unwrap();
        assert_eq!(key.public_key().bits(), 1024);
        assert_eq!(key.to_pem(KeySyntax::Pkcs1), PKCS1_PEM);

        let pk = PublicKey::from_pem(SPKI_PEM).unwrap();
        assert_eq!(&pk, key.public_key());
        assert_eq!(pk.to_pem(KeySyntax::Pkcs8), SPKI_PEM);

        // DER round trip
        for syntax in [KeySyntax::Pkcs1, KeySyntax::Pkcs8] {
            let der = key.to_der(syntax);
            assert_eq!(PrivateKey::from_der(&der, syntax).unwrap(), key);
            assert_eq!(PrivateKey::from_der(&der, syntax).unwrap().to_der(syntax), der);

            let der = pk.to_der(syntax);
            assert_eq!(PublicKey::from_der(&der, syntax).unwrap(), pk);
        }
    }

    #[test]
    fn key_parse_detects_kind() {
        let key = Key::from(PrivateKey::from_pem(PKCS1_PEM).unwrap());
        let public = Key::from(key.public_key().clone());
        let policy = KeyPolicy::default();

        for format in all_formats() {
            let bytes = key.serialize(format).unwrap();
            assert_eq!(Key::parse(&bytes, format, &policy).unwrap(), key, "{format:?}");

            let bytes = public.serialize(format).unwrap();
            let parsed = Key::parse(&bytes, format, &policy).unwrap();
            assert!(!parsed.is_private());
            assert!(parsed.private_key().is_none());
            assert_eq!(parsed, public, "{format:?}");
        }

        // PEM ignores the requested syntax
        let parsed = Key::parse(SPKI_PEM.as_bytes(), KeyFormat::PKCS1_PEM, &policy).unwrap();
        assert_eq!(parsed, public);
    }

    #[test]
    fn policy_rejects_small_keys() {
        let key = Key::from(key512());
        let der = key.serialize(KeyFormat::PKCS8_DER).unwrap();
        assert_eq!(
            Key::parse(&der, KeyFormat::PKCS8_DER, &KeyPolicy::default()),
            Err(CipherError::KeyTooSmall {
                bits: 512,
                min: 1024
            })
        );

        let relaxed = KeyPolicy {
            min_modulus_bits: 512,
        };
        assert_eq!(Key::parse(&der, KeyFormat::PKCS8_DER, &relaxed).unwrap(), key);
    }

    #[test]
    fn components_json() {
        let key = key512();
        let json = Key::from(key.clone())
            .serialize(KeyFormat::COMPONENTS)
            .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&json).unwrap();
        for field in ["n", "e", "d", "p", "q", "dmp1", "dmq1", "coeff"] {
            assert!(v[field].is_string(), "{field}");
        }
        assert_eq!(v["e"], "010001");

        let policy = KeyPolicy {
            min_modulus_bits: 512,
        };
        let (n, e, d, p, q) = (
            v["n"].as_str().unwrap(),
            v["e"].as_str().unwrap(),
            v["d"].as_str().unwrap(),
            v["p"].as_str().unwrap(),
            v["q"].as_str().unwrap(),
        );

        // CRT values derived
        let minimal = format!(r#"{{"n":"{n}","e":"10001","d":"{d}","p":"{p}","q":"{q}"}}"#);
        assert_eq!(
            Key::parse(minimal.as_bytes(), KeyFormat::COMPONENTS, &policy).unwrap(),
            Key::Private(key.clone())
        );

        let public = format!(r#"{{"n":"{n}","e":"{e}"}}"#);
        assert_eq!(
            Key::parse(public.as_bytes(), KeyFormat::COMPONENTS, &policy).unwrap(),
            Key::Public(key.public_key().clone())
        );

        let bad = [
            format!(r#"{{"n":"{n}","e":"{e}","d":"{d}","p":"{p}"}}"#),
            format!(r#"{{"n":"{n}","e":"{e}","d":"{d}","p":"{p}","q":"{q}","coeff":"01"}}"#),
            format!(r#"{{"n":"{n}","e":"zz"}}"#),
            format!(r#"{{"n":"{n}","e":""}}"#),
            r#"{"e":"010001"}"#.to_string(),
            "not json".to_string(),
        ];
        for (i, doc) in bad.iter().enumerate() {
            assert!(
                matches!(
                    Key::parse(doc.as_bytes(), KeyFormat::COMPONENTS, &policy),
                    Err(CipherError::KeyFormat(_))
                ),
                "case {i}"
            );
        }
    }

    #[test]
    fn malformed_der() {
        let key = PrivateKey::from_pem(PKCS1_PEM).unwrap();
        let policy = KeyPolicy::default();
        let is_format_err = |r: Result<Key, CipherError>| matches!(r, Err(CipherError::KeyFormat(_)));

        let der = key.to_der(KeySyntax::Pkcs1);
        let mut trailing = der.clone();
        trailing.push(0);
        assert!(is_format_err(Key::parse(&trailing, KeyFormat::PKCS1_DER, &policy)));
        assert!(is_format_err(Key::parse(&der[..der.len() - 1], KeyFormat::PKCS1_DER, &policy)));
        assert!(is_format_err(Key::parse(&[], KeyFormat::PKCS1_DER, &policy)));
        assert!(is_format_err(Key::parse(&der, KeyFormat::PKCS8_DER, &policy)));

        // version 1, the multi-prime form
        let mut v1 = der.clone();
        let pos = v1.windows(3).position(|w| w == [0x02, 0x01, 0x00]).unwrap();
        v1[pos + 2] = 1;
        assert!(is_format_err(Key::parse(&v1, KeyFormat::PKCS1_DER, &policy)));

        // unknown algorithm
        let mut spki = key.public_key().to_der(KeySyntax::Pkcs8);
        let pos = spki
            .windows(super::RSA_ENCRYPTION_OID.len())
            .position(|w| w == super::RSA_ENCRYPTION_OID)
            .unwrap();
        spki[pos + 8] = 0x0a;
        assert!(is_format_err(Key::parse(&spki, KeyFormat::PKCS8_DER, &policy)));

        // modulus changed, n != p * q
        let mut bad_n = der.clone();
        bad_n[20] ^= 0x01;
        assert!(is_format_err(Key::parse(&bad_n, KeyFormat::PKCS1_DER, &policy)));
    }

    #[test]
    fn pem_kind_mismatch() {
        assert!(matches!(
            PrivateKey::from_pem(SPKI_PEM),
            Err(CipherError::KeyFormat(_))
        ));
        assert!(matches!(
            PublicKey::from_pem(PKCS1_PEM),
            Err(CipherError::KeyFormat(_))
        ));
        assert!(matches!(
            Key::parse(&[0xff, 0xfe], KeyFormat::PKCS1_PEM, &KeyPolicy::default()),
            Err(CipherError::KeyFormat(_))
        ));
    }
}
