//! Codecs for RSA key documents: a strict DER reader/writer and RFC 7468 PEM armor.

pub mod der;
mod error;
pub mod pem;

pub use error::EncodeError;
