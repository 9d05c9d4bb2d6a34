use crate::Rand;
use xrand::rngs::OsRng;
use xrand::RngCore;

/// 默认使用OsRng <br>
/// Zero-sized and `Copy`, each copy reads the OS generator independently.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultRand {
    rng: OsRng,
}

impl Rand for DefaultRand {
    fn rand(&mut self, random: &mut [u8]) {
        self.rng.fill_bytes(random);
    }
}
