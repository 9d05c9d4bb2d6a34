use crate::{ArithmeticError, BigUintExt};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::borrow::Borrow;
use std::ops::Deref;
use subtle::{ConditionallySelectable, ConstantTimeEq};

const WINDOW: usize = 4;
const TABLE_LEN: usize = 1 << WINDOW;

impl<T: Borrow<BigUint>> BigUintExt<T> {
    /// self^exp mod modulus with a fixed 4-bit window.
    ///
    /// The sequence of squarings and multiplications depends only on
    /// `max(bits(modulus), bits(exp))`; every window reads all 16 table entries and keeps the
    /// wanted one with a masked select, so the memory access pattern does not follow `exp`.
    pub fn ct_modpow(&self, exp: &BigUint, modulus: &BigUint) -> Result<BigUint, ArithmeticError> {
        if modulus.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        if modulus.is_one() {
            return Ok(BigUint::zero());
        }

        let base = self.deref() % modulus;
        let limbs = ((modulus.bits() + 31) >> 5) as usize;

        // table[i] = base^i mod modulus, as fixed-width little-endian u32 limbs
        let mut table = Vec::with_capacity(TABLE_LEN);
        let mut cur = BigUint::one();
        for _ in 0..TABLE_LEN {
            table.push(to_limbs(&cur, limbs));
            cur = &cur * &base % modulus;
        }

        let nbits = modulus.bits().max(exp.bits()) as usize;
        let windows = (nbits + WINDOW - 1) / WINDOW;
        let exp_limbs = to_limbs(exp, (windows * WINDOW + 31) >> 5);

        let (mut acc, mut entry) = (BigUint::one(), vec![0u32; limbs]);
        for w in (0..windows).rev() {
            for _ in 0..WINDOW {
                acc = &acc * &acc % modulus;
            }

            let bit = w * WINDOW;
            let idx = ((exp_limbs[bit >> 5] >> (bit & 31)) & (TABLE_LEN as u32 - 1)) as u8;
            select(&table, idx, &mut entry);
            acc = &acc * BigUint::from_slice(&entry) % modulus;
        }

        Ok(acc)
    }
}

fn to_limbs(x: &BigUint, len: usize) -> Vec<u32> {
    let mut out = vec![0u32; len];
    for (o, d) in out.iter_mut().zip(x.iter_u32_digits()) {
        *o = d;
    }
    out
}

fn select(table: &[Vec<u32>], idx: u8, out: &mut [u32]) {
    out.iter_mut().for_each(|x| *x = 0);
    for (i, row) in table.iter().enumerate() {
        let choice = (i as u8).ct_eq(&idx);
        for (o, &v) in out.iter_mut().zip(row.iter()) {
            o.conditional_assign(&v, choice);
        }
    }
}
