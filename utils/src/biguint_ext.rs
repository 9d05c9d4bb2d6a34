use crate::ArithmeticError;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rand;
use std::borrow::Borrow;
use std::ops::Deref;

/// odd primes below 256, used to sieve candidates before Miller-Rabin
const SMALL_PRIMES: [u32; 53] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Borrowing extension over `BigUint`, `BigUintExt(&n)` and `BigUintExt(n)` both work.
pub struct BigUintExt<T: Borrow<BigUint>>(pub T);

impl<T: Borrow<BigUint>> Deref for BigUintExt<T> {
    type Target = BigUint;
    fn deref(&self) -> &Self::Target {
        self.0.borrow()
    }
}

impl<T: Borrow<BigUint>> BigUintExt<T> {
    /// self * inv = 1 \mod modulus
    ///
    /// extended Euclid; `None` if `gcd(self, modulus) != 1` or `modulus` is zero.
    pub fn modinv(&self, modulus: &BigUint) -> Option<BigUint> {
        if modulus.is_zero() {
            return None;
        }

        let (a, n) = (
            BigInt::from(self.deref() % modulus),
            BigInt::from(modulus.clone()),
        );
        let g = a.extended_gcd(&n);
        if !g.gcd.is_one() {
            return None;
        }

        g.x.mod_floor(&n).to_biguint()
    }

    /// I2OSP: big-endian bytes left-padded with zeros to exactly `len` bytes.
    pub fn to_bytes_be_padded(&self, len: usize) -> Result<Vec<u8>, ArithmeticError> {
        let mut out = vec![0u8; len];
        if self.is_zero() {
            return Ok(out);
        }

        let bytes = self.to_bytes_be();
        if bytes.len() > len {
            return Err(ArithmeticError::Overflow);
        }

        out[(len - bytes.len())..].copy_from_slice(&bytes);
        Ok(out)
    }

    /// uniform sample in `[0, self)` by rejection
    pub fn gen_below<R: Rand + ?Sized>(&self, rng: &mut R) -> Result<BigUint, ArithmeticError> {
        if self.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }

        let bits = self.bits() as usize;
        let mut buf = vec![0u8; (bits + 7) >> 3];
        let top_mask = match bits & 7 {
            0 => 0xffu8,
            b => (1u8 << b) - 1,
        };

        loop {
            rng.rand(buf.as_mut_slice());
            buf[0] &= top_mask;
            let r = BigUint::from_bytes_be(&buf);
            if &r < self.deref() {
                return Ok(r);
            }
        }
    }

    /// probability prime test by trial division over the primes below 256 followed by `rounds`
    /// Miller-Rabin iterations with random bases.
    ///
    /// For any odd composite the probability that one round passes is at most 1/4, so `rounds`
    /// rounds err with probability at most $2^{-2 \cdot rounds}$.
    pub fn probably_prime<R: Rand + ?Sized>(&self, rounds: usize, rng: &mut R) -> bool {
        let n = self.deref();
        if n < &BigUint::from(2u8) {
            return false;
        }
        if n.is_even() {
            return n == &BigUint::from(2u8);
        }

        for &p in SMALL_PRIMES.iter() {
            let r = n % p;
            if r.is_zero() {
                return n == &BigUint::from(p);
            }
        }

        // every composite below 257^2 has a factor in the table
        if n.bits() <= 16 {
            return true;
        }

        self.miller_rabin(rounds, rng)
    }

    /// n - 1 = 2^s * r, r odd; n is an odd number greater than 256
    fn miller_rabin<R: Rand + ?Sized>(&self, rounds: usize, rng: &mut R) -> bool {
        let n = self.deref();
        let n_m1 = n - 1u32;
        let s = n_m1.trailing_zeros().unwrap_or(0);
        let r = &n_m1 >> s;
        // bases are drawn from [2, n-2]
        let span = n - 3u32;

        'witness: for _ in 0..rounds {
            let a = match BigUintExt(&span).gen_below(rng) {
                Ok(x) => x + 2u32,
                Err(_) => return false,
            };

            let mut y = a.modpow(&r, n);
            if y.is_one() || y == n_m1 {
                continue;
            }

            for _ in 1..s {
                y = &y * &y % n;
                if y == n_m1 {
                    continue 'witness;
                }
                if y.is_one() {
                    return false;
                }
            }

            return false;
        }

        true
    }
}

/// Random odd integer of exactly `bits` bits whose two most significant bits are set, so that the
/// product of two candidates never comes out one bit short. `bits` below 2 are raised to 2.
pub fn prime_candidate<R: Rand + ?Sized>(bits: usize, rng: &mut R) -> BigUint {
    let bits = bits.max(2);
    let mut buf = vec![0u8; (bits + 7) >> 3];
    rng.rand(buf.as_mut_slice());

    let b = match bits & 7 {
        0 => 8,
        b => b,
    };
    if b != 8 {
        buf[0] &= (1u8 << b) - 1;
    }

    if b >= 2 {
        buf[0] |= 3 << (b - 2);
    } else {
        buf[0] |= 1;
        buf[1] |= 0x80;
    }

    if let Some(x) = buf.last_mut() {
        *x |= 1;
    }

    BigUint::from_bytes_be(&buf)
}
