//! 两素数RSA密钥生成
//!
//! - 候选数: 最高两位置1的奇数, 保证$p*q$恰好为`bits`位;
//! - $\gcd(e, c-1) \ne 1$的候选数在素性测试之前即被丢弃;
//! - $d = e^{-1} \mod \mathrm{lcm}(p-1, q-1)$;
//!

use crate::rsa::PrivateKey;
use crate::{CipherError, DefaultRand, Rand};
use log::{debug, trace};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use utils::{prime_candidate, BigUintExt};

/// Miller-Rabin rounds never go below this, error rate at most $2^{-80}$
pub const MIN_PRIME_TEST_ROUNDS: usize = 40;

// p == q, or a product one bit short
const MAX_PAIR_ATTEMPTS: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyGenParams {
    /// modulus bit length
    pub bits: usize,
    pub public_exponent: u64,
    pub prime_test_rounds: usize,
    /// each prime search gives up after `candidates_per_bit * prime bits` candidates
    pub candidates_per_bit: usize,
    /// smallest accepted modulus
    pub min_bits: usize,
}

impl Default for KeyGenParams {
    fn default() -> Self {
        Self {
            bits: 2048,
            public_exponent: 65537,
            prime_test_rounds: MIN_PRIME_TEST_ROUNDS,
            candidates_per_bit: 20,
            min_bits: 1024,
        }
    }
}

impl KeyGenParams {
    pub fn new(bits: usize, public_exponent: u64) -> Self {
        Self {
            bits,
            public_exponent,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), CipherError> {
        if self.public_exponent < 3 {
            return Err(CipherError::InvalidParameter(format!(
                "public exponent {} is below 3",
                self.public_exponent
            )));
        }
        if self.bits < self.min_bits {
            return Err(CipherError::KeyTooSmall {
                bits: self.bits,
                min: self.min_bits,
            });
        }
        Ok(())
    }

    fn rounds(&self) -> usize {
        self.prime_test_rounds.max(MIN_PRIME_TEST_ROUNDS)
    }

    // (bits of p, bits of q)
    fn prime_bits(&self) -> (usize, usize) {
        (self.bits - (self.bits >> 1), self.bits >> 1)
    }
}

/// Generates a two-prime key, `p` and `q` are searched in parallel with the OS generator.
pub fn generate_key(params: &KeyGenParams) -> Result<PrivateKey, CipherError> {
    params.check()?;
    let (e, (pbits, qbits)) = (BigUint::from(params.public_exponent), params.prime_bits());
    debug!(
        "rsa: generating {}-bit key, e = {}",
        params.bits, params.public_exponent
    );

    for _ in 0..MAX_PAIR_ATTEMPTS {
        let (p, q) = rayon::join(
            || search_prime(pbits, &e, params, &mut DefaultRand::default()),
            || search_prime(qbits, &e, params, &mut DefaultRand::default()),
        );

        if let Some(key) = assemble(params, &e, p?, q?) {
            debug!("rsa: {}-bit key generated", params.bits);
            return Ok(key);
        }
    }

    Err(CipherError::GenerationTimeout {
        attempts: MAX_PAIR_ATTEMPTS,
    })
}

/// Like [`generate_key`], drawing every candidate from `rng` in sequence.
pub fn generate_key_with_rng<R: Rand + ?Sized>(
    params: &KeyGenParams,
    rng: &mut R,
) -> Result<PrivateKey, CipherError> {
    params.check()?;
    let (e, (pbits, qbits)) = (BigUint::from(params.public_exponent), params.prime_bits());
    debug!(
        "rsa: generating {}-bit key, e = {}",
        params.bits, params.public_exponent
    );

    for _ in 0..MAX_PAIR_ATTEMPTS {
        let p = search_prime(pbits, &e, params, rng)?;
        let q = search_prime(qbits, &e, params, rng)?;

        if let Some(key) = assemble(params, &e, p, q) {
            debug!("rsa: {}-bit key generated", params.bits);
            return Ok(key);
        }
    }

    Err(CipherError::GenerationTimeout {
        attempts: MAX_PAIR_ATTEMPTS,
    })
}

fn search_prime<R: Rand + ?Sized>(
    bits: usize,
    e: &BigUint,
    params: &KeyGenParams,
    rng: &mut R,
) -> Result<BigUint, CipherError> {
    let (budget, rounds) = (params.candidates_per_bit.saturating_mul(bits), params.rounds());

    for attempt in 1..=budget {
        let c = prime_candidate(bits, rng);
        if !(&c - 1u32).gcd(e).is_one() {
            continue;
        }

        if BigUintExt(&c).probably_prime(rounds, rng) {
            trace!("rsa: {bits}-bit prime after {attempt} candidates");
            return Ok(c);
        }
    }

    Err(CipherError::GenerationTimeout { attempts: budget })
}

fn assemble(params: &KeyGenParams, e: &BigUint, p: BigUint, q: BigUint) -> Option<PrivateKey> {
    if p == q {
        trace!("rsa: p == q, retrying");
        return None;
    }
    if (&p * &q).bits() as usize != params.bits {
        return None;
    }

    let lambda = (&p - 1u32).lcm(&(&q - 1u32));
    let d = BigUintExt(e).modinv(&lambda)?;
    PrivateKey::from_primes_uncheck(e.clone(), d, p, q)
}
