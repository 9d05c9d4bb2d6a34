//! Random byte sources used by the RSA primitives.
//!
//! Every operation takes its generator by `&mut R`, so a generator is never
//! shared between threads. `DefaultRand` is a zero-sized handle to the OS
//! generator, independent instances cost nothing.

/// A cryptographically secure source of random bytes.
pub trait Rand {
    fn rand(&mut self, random: &mut [u8]);

    /// fill `random` with bytes in `1..=255`
    fn rand_nonzero(&mut self, random: &mut [u8]) {
        let mut byte = [0u8; 1];
        for x in random.iter_mut() {
            while *x == 0 {
                self.rand(&mut byte);
                *x = byte[0];
            }
        }
    }
}

mod default_rand;
pub use default_rand::DefaultRand;

impl<T: xrand::RngCore + xrand::CryptoRng> Rand for T {
    fn rand(&mut self, random: &mut [u8]) {
        self.fill_bytes(random);
    }
}
