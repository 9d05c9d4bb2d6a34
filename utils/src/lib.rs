//! Big-integer helpers for RSA on top of `num_bigint::BigUint`.

mod error;
pub use error::ArithmeticError;

mod biguint_ext;
pub use biguint_ext::{prime_candidate, BigUintExt};

mod modpow;
