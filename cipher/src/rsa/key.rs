//! RSA key material and the raw RSAEP / RSADP primitives, RFC 8017 §3 and §5.1

use crate::rsa::SecretBytes;
use crate::{CipherError, Rand};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use std::fmt::{Debug, Display, Formatter};
use utils::{ArithmeticError, BigUintExt};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PublicKey {
    // n = p * q
    n: BigUint,
    // public exponent, gcd(e, (p-1)(q-1)) = 1
    e: BigUint,
}

#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pk: PublicKey,
    // d * e = 1 mod lcm(p-1, q-1)
    d: BigUint,
    p: BigUint,
    q: BigUint,
    // 预计算值, 加速私钥的计算
    pre: PrecomputedValues,
}

#[derive(Clone, PartialEq, Eq)]
struct PrecomputedValues {
    // d % (p - 1)
    d_p: BigUint,
    // d % (q - 1)
    d_q: BigUint,
    // q^{-1} % p
    q_inv: BigUint,
}

impl PublicKey {
    /// n: RSA modulus, e: public exponent.
    ///
    /// `n` must be odd and greater than 1, `e` odd with `3 <= e < n`.
    pub fn new(n: BigUint, e: BigUint) -> Result<Self, CipherError> {
        if n <= BigUint::one() || n.is_even() {
            return Err(CipherError::KeyFormat(
                "modulus must be an odd integer greater than 1".to_string(),
            ));
        }
        if e < BigUint::from(3u8) || e.is_even() || e >= n {
            return Err(CipherError::KeyFormat(format!(
                "public exponent {e:#x} must be odd and in [3, n)"
            )));
        }

        Ok(Self { n, e })
    }

    pub(crate) fn new_uncheck(n: BigUint, e: BigUint) -> Self {
        Self { n, e }
    }

    /// n
    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    /// e
    pub fn exponent(&self) -> &BigUint {
        &self.e
    }

    /// bit length of the modulus
    pub fn bits(&self) -> usize {
        self.n.bits() as usize
    }

    /// modulus length in bytes, the length of every ciphertext and signature
    pub fn size(&self) -> usize {
        (self.bits() + 7) >> 3
    }

    pub fn check_size(&self, min_bits: usize) -> Result<(), CipherError> {
        if self.bits() < min_bits {
            Err(CipherError::KeyTooSmall {
                bits: self.bits(),
                min: min_bits,
            })
        } else {
            Ok(())
        }
    }

    /// RSAEP: $m^e \mod n$, the caller guarantees $m \lt n$
    pub(crate) fn rsaep(&self, m: &BigUint) -> BigUint {
        m.modpow(&self.e, &self.n)
    }

    /// OS2IP, RSAEP, I2OSP to `size()` bytes
    pub(crate) fn encrypt_raw(&self, em: &[u8]) -> Result<Vec<u8>, CipherError> {
        let m = BigUint::from_bytes_be(em);
        if &m >= self.modulus() {
            return Err(CipherError::InvalidParameter(
                "message representative out of range".to_string(),
            ));
        }

        let c = self.rsaep(&m);
        Ok(BigUintExt(&c).to_bytes_be_padded(self.size())?)
    }

    /// RSAVP1 over a `size()`-byte signature, `None` if `s >= n` or the length is wrong
    pub(crate) fn verify_raw(&self, sig: &[u8], em_len: usize) -> Option<Vec<u8>> {
        if sig.len() != self.size() {
            return None;
        }

        let s = BigUint::from_bytes_be(sig);
        if &s >= self.modulus() {
            return None;
        }

        BigUintExt(self.rsaep(&s)).to_bytes_be_padded(em_len).ok()
    }
}

impl PrivateKey {
    /// Builds a key from `n, e, d, p, q` and derives the CRT values.
    pub fn from_components(
        n: BigUint,
        e: BigUint,
        d: BigUint,
        p: BigUint,
        q: BigUint,
    ) -> Result<Self, CipherError> {
        let pk = PublicKey::new(n, e)?;
        Self::check_factors(&pk, &d, &p, &q)?;

        let pre = PrecomputedValues::new(&d, &p, &q).ok_or_else(|| {
            CipherError::KeyFormat("q is not invertible modulo p".to_string())
        })?;

        Ok(Self { pk, d, p, q, pre })
    }

    /// Like [`PrivateKey::from_components`], additionally checking the stored CRT values
    /// against the derived ones.
    #[allow(clippy::too_many_arguments)]
    pub fn from_crt_components(
        n: BigUint,
        e: BigUint,
        d: BigUint,
        p: BigUint,
        q: BigUint,
        d_p: BigUint,
        d_q: BigUint,
        q_inv: BigUint,
    ) -> Result<Self, CipherError> {
        let key = Self::from_components(n, e, d, p, q)?;
        if key.pre.d_p != d_p || key.pre.d_q != d_q || key.pre.q_inv != q_inv {
            return Err(CipherError::KeyFormat(
                "inconsistent CRT values".to_string(),
            ));
        }
        Ok(key)
    }

    /// primes already checked by key generation, `d = e^{-1} mod lcm(p-1, q-1)`
    pub(crate) fn from_primes_uncheck(e: BigUint, d: BigUint, p: BigUint, q: BigUint) -> Option<Self> {
        let pre = PrecomputedValues::new(&d, &p, &q)?;
        Some(Self {
            pk: PublicKey::new_uncheck(&p * &q, e),
            d,
            p,
            q,
            pre,
        })
    }

    fn check_factors(
        pk: &PublicKey,
        d: &BigUint,
        p: &BigUint,
        q: &BigUint,
    ) -> Result<(), CipherError> {
        let one = BigUint::one();
        if p <= &one || q <= &one {
            return Err(CipherError::KeyFormat("invalid prime value".to_string()));
        }
        if p == q {
            return Err(CipherError::KeyFormat("p and q are equal".to_string()));
        }
        if &(p * q) != pk.modulus() {
            return Err(CipherError::KeyFormat("n != p * q".to_string()));
        }
        if d.is_zero() || d >= pk.modulus() {
            return Err(CipherError::KeyFormat(
                "private exponent out of range".to_string(),
            ));
        }

        // e * d = 1 mod (p-1) and mod (q-1), i.e. mod lcm(p-1, q-1)
        let de = d * pk.exponent();
        for prime in [p, q] {
            if !(&de % (prime - &one)).is_one() {
                return Err(CipherError::KeyFormat(
                    "private exponent does not match the public exponent".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    /// d
    pub fn private_exponent(&self) -> &BigUint {
        &self.d
    }

    /// (p, q)
    pub fn primes(&self) -> (&BigUint, &BigUint) {
        (&self.p, &self.q)
    }

    /// (d mod (p-1), d mod (q-1))
    pub fn crt_exponents(&self) -> (&BigUint, &BigUint) {
        (&self.pre.d_p, &self.pre.d_q)
    }

    /// q^{-1} mod p
    pub fn crt_coefficient(&self) -> &BigUint {
        &self.pre.q_inv
    }

    /// RSADP: $c^d \mod n$ through the CRT, with blinding and a fault check.
    ///
    /// `c >= n` is reported as [`CipherError::Decryption`].
    pub(crate) fn rsadp<R: Rand + ?Sized>(
        &self,
        c: &BigUint,
        rng: &mut R,
    ) -> Result<BigUint, CipherError> {
        let n = self.pk.modulus();
        if c >= n {
            return Err(CipherError::Decryption);
        }

        // c' = c * r^e, m = c'^d * r^{-1} = c^d
        let (r, r_inv) = self.blinding_pair(rng)?;
        let blinded = c * self.pk.rsaep(&r) % n;
        let m = self.rsadp_crt(&blinded)? * r_inv % n;

        if &self.pk.rsaep(&m) != c {
            return Err(ArithmeticError::Fault.into());
        }

        Ok(m)
    }

    /// OS2IP, RSADP, I2OSP; the input must be exactly `size()` bytes
    pub(crate) fn decrypt_raw<R: Rand + ?Sized>(
        &self,
        ciphertext: &[u8],
        rng: &mut R,
    ) -> Result<SecretBytes, CipherError> {
        let k = self.pk.size();
        if ciphertext.len() != k {
            return Err(CipherError::CiphertextLength {
                len: ciphertext.len(),
                expected: k,
            });
        }

        let m = self.rsadp(&BigUint::from_bytes_be(ciphertext), rng)?;
        Ok(BigUintExt(&m).to_bytes_be_padded(k)?.into())
    }

    /// RSASP1 over an encoded message, the signature is `size()` bytes
    pub(crate) fn sign_raw<R: Rand + ?Sized>(
        &self,
        em: &[u8],
        rng: &mut R,
    ) -> Result<Vec<u8>, CipherError> {
        let s = self.rsadp(&BigUint::from_bytes_be(em), rng)?;
        Ok(BigUintExt(&s).to_bytes_be_padded(self.pk.size())?)
    }

    fn blinding_pair<R: Rand + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(BigUint, BigUint), CipherError> {
        let n = self.pk.modulus();
        loop {
            let r = BigUintExt(n).gen_below(rng)?;
            if r.is_zero() {
                continue;
            }
            if let Some(r_inv) = BigUintExt(&r).modinv(n) {
                return Ok((r, r_inv));
            }
        }
    }

    // m1 = c^{dp} % p, m2 = c^{dq} % q
    // h = (m1 - m2) * qinv % p
    // m = m2 + q * h
    fn rsadp_crt(&self, c: &BigUint) -> Result<BigUint, CipherError> {
        let (p, q) = (&self.p, &self.q);
        let m1 = BigUintExt(c).ct_modpow(&self.pre.d_p, p)?;
        let m2 = BigUintExt(c).ct_modpow(&self.pre.d_q, q)?;

        // m1, m2 % p < p, 不按大小分支
        let diff = (m1 + p - &m2 % p) % p;
        let h = diff * &self.pre.q_inv % p;

        Ok(m2 + h * q)
    }
}

impl PrecomputedValues {
    fn new(d: &BigUint, p: &BigUint, q: &BigUint) -> Option<Self> {
        let one = BigUint::one();
        Some(Self {
            d_p: d % (p - &one),
            d_q: d % (q - &one),
            q_inv: BigUintExt(q).modinv(p)?,
        })
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{n={:#x}, e={:#x}}}", self.n, self.e)
    }
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("pk", &self.pk)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{PrecomputedValues, PrivateKey, PublicKey};
    use crate::{CipherError, DefaultRand};
    use num_bigint::BigUint;
    use num_traits::Num;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use utils::ArithmeticError;

    fn dec(s: &str) -> BigUint {
        BigUint::from_str_radix(s, 10).unwrap()
    }

    /// 512-bit two-prime key
    pub(crate) fn key512() -> PrivateKey {
        PrivateKey::from_components(
            dec("9353930466774385905609975137998169297361893554149986716853295022578535724979677252958524466350471210367835187480748268864277464700638583474144061408845077"),
            BigUint::from(65537u32),
            dec("7266398431328116344057699379749222532279343923819063639497049039389899328538543087657733766554155839834519529439851673014800261285757759040931985506583861"),
            dec("98920366548084643601728869055592650835572950932266967461790948584315647051443"),
            dec("94560208308847015747498523884063394671606671904944666360068158221458669711639"),
        )
        .unwrap()
    }

    #[test]
    fn key_basics() {
        let key = key512();
        let pk = key.public_key();
        assert_eq!(pk.bits(), 512);
        assert_eq!(pk.size(), 64);
        assert!(pk.exponent() <= pk.modulus());
        assert_eq!(
            pk.check_size(1024),
            Err(CipherError::KeyTooSmall {
                bits: 512,
                min: 1024
            })
        );
        pk.check_size(512).unwrap();

        let mut rng = DefaultRand::default();
        for m in [0u32, 1, 42, 65537] {
            let m = BigUint::from(m);
            let c = pk.rsaep(&m);
            assert_eq!(key.rsadp(&c, &mut rng).unwrap(), m);
        }

        let m = key.public_key().modulus() - 2u32;
        let c = pk.rsaep(&m);
        assert_eq!(key.rsadp(&c, &mut rng).unwrap(), m);
    }

    #[test]
    fn rsadp_matches_plain_exponentiation() {
        let key = key512();
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        for i in 1u32..16 {
            let c = BigUint::from(i).pow(37) % key.public_key().modulus();
            let expected = c.modpow(key.private_exponent(), key.public_key().modulus());
            assert_eq!(key.rsadp(&c, &mut rng).unwrap(), expected);
        }
    }

    #[test]
    fn crt_halves_in_either_order() {
        let key = key512();
        let (p, q) = key.primes();
        let (p, q) = (p.clone(), q.clone());
        let pk = key.public_key();
        // m = p: m1 = 0 < m2 % p; m = q: m1 = q > m2 % p = 0
        for m in [p.clone(), q.clone(), pk.modulus() - 1u32, BigUint::from(2u32)] {
            let c = m.modpow(pk.exponent(), pk.modulus());
            assert_eq!(key.rsadp_crt(&c).unwrap(), m);
        }
        assert!(p > q);
    }

    #[test]
    fn rsadp_rejects_out_of_range() {
        let key = key512();
        let n = key.public_key().modulus().clone();
        let mut rng = DefaultRand::default();
        assert_eq!(key.rsadp(&n, &mut rng), Err(CipherError::Decryption));
        assert_eq!(
            key.rsadp(&(&n + 1u32), &mut rng),
            Err(CipherError::Decryption)
        );
    }

    #[test]
    fn fault_is_detected() {
        let good = key512();
        let mut bad = good.clone();
        bad.pre = PrecomputedValues {
            d_p: &good.pre.d_p + 1u32,
            ..good.pre.clone()
        };

        let c = good.public_key().rsaep(&BigUint::from(1234567u32));
        assert_eq!(
            bad.rsadp(&c, &mut DefaultRand::default()),
            Err(CipherError::Arithmetic(ArithmeticError::Fault))
        );
    }

    #[test]
    fn public_key_validation() {
        let cases = [
            (BigUint::from(3233u32), BigUint::from(17u32), true),
            (BigUint::from(3232u32), BigUint::from(17u32), false),
            (BigUint::from(1u32), BigUint::from(3u32), false),
            (BigUint::from(3233u32), BigUint::from(1u32), false),
            (BigUint::from(3233u32), BigUint::from(2u32), false),
            (BigUint::from(3233u32), BigUint::from(16u32), false),
            (BigUint::from(3233u32), BigUint::from(3233u32), false),
        ];
        for (n, e, ok) in cases {
            assert_eq!(PublicKey::new(n.clone(), e.clone()).is_ok(), ok, "n={n}, e={e}");
        }
    }

    #[test]
    fn private_key_validation() {
        let key = key512();
        let (n, e, d) = (
            key.public_key().modulus().clone(),
            key.public_key().exponent().clone(),
            key.private_exponent().clone(),
        );
        let (p, q) = (key.primes().0.clone(), key.primes().1.clone());

        // swapped primes are fine, the CRT values follow
        let swapped =
            PrivateKey::from_components(n.clone(), e.clone(), d.clone(), q.clone(), p.clone())
                .unwrap();
        assert_eq!(swapped.public_key(), key.public_key());

        let bad = [
            PrivateKey::from_components(n.clone(), e.clone(), d.clone(), p.clone(), p.clone()),
            PrivateKey::from_components(&n + 2u32, e.clone(), d.clone(), p.clone(), q.clone()),
            PrivateKey::from_components(n.clone(), e.clone(), &d + 2u32, p.clone(), q.clone()),
            PrivateKey::from_components(
                n.clone(),
                BigUint::from(3u32),
                d.clone(),
                p.clone(),
                q.clone(),
            ),
            PrivateKey::from_components(n.clone(), e.clone(), d.clone(), BigUint::from(1u32), n.clone()),
        ];
        for (i, r) in bad.into_iter().enumerate() {
            assert!(
                matches!(r, Err(CipherError::KeyFormat(_))),
                "case {i}: {r:?}"
            );
        }

        let (dp, dq) = key.crt_exponents();
        let ok = PrivateKey::from_crt_components(
            n.clone(),
            e.clone(),
            d.clone(),
            p.clone(),
            q.clone(),
            dp.clone(),
            dq.clone(),
            key.crt_coefficient().clone(),
        )
        .unwrap();
        assert_eq!(ok, key);

        let err = PrivateKey::from_crt_components(
            n,
            e,
            d,
            p,
            q,
            dp.clone(),
            dq.clone(),
            key.crt_coefficient() + 1u32,
        );
        assert!(matches!(err, Err(CipherError::KeyFormat(_))));
    }

    #[test]
    fn debug_hides_secrets() {
        let key = key512();
        let s = format!("{:?}", key);
        assert!(s.starts_with("PrivateKey"));
        assert!(!s.contains(&format!("{:?}", key.private_exponent())));
    }
}
