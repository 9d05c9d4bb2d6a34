//! MGF1, RFC 8017 §B.2.1

use crate::HashAlgorithm;

/// out ^= MGF1(seed, out.len())
///
/// T = Hash(seed || C(0)) || Hash(seed || C(1)) || ..., C(i) the big-endian 32-bit counter
pub(crate) fn mgf1_xor(out: &mut [u8], hash: HashAlgorithm, seed: &[u8]) {
    let mut counter = 0u32;
    for chunk in out.chunks_mut(hash.output_len()) {
        let mask = hash.digest_parts(&[seed, &counter.to_be_bytes()]);
        chunk.iter_mut().zip(mask.iter()).for_each(|(a, &b)| *a ^= b);
        counter = counter.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::mgf1_xor;
    use crate::HashAlgorithm;

    #[test]
    fn mask_prefix_is_stable() {
        // a longer mask starts with the shorter one
        let seed = b"mgf1 seed";
        for hash in [HashAlgorithm::Sha1, HashAlgorithm::Sha256] {
            let (mut short, mut long) = (vec![0u8; 7], vec![0u8; 3 * hash.output_len() + 5]);
            mgf1_xor(&mut short, hash, seed);
            mgf1_xor(&mut long, hash, seed);
            assert_eq!(&long[..7], short.as_slice());

            let first = hash.digest_parts(&[&seed[..], &[0, 0, 0, 0][..]]);
            let second = hash.digest_parts(&[&seed[..], &[0, 0, 0, 1][..]]);
            assert_eq!(&long[..hash.output_len()], first.as_slice());
            assert_eq!(
                &long[hash.output_len()..2 * hash.output_len()],
                second.as_slice()
            );
        }
    }

    #[test]
    fn xor_is_involution() {
        let mut buf = b"some data block of arbitrary length".to_vec();
        let orig = buf.clone();
        mgf1_xor(&mut buf, HashAlgorithm::Sha512, b"seed");
        assert_ne!(buf, orig);
        mgf1_xor(&mut buf, HashAlgorithm::Sha512, b"seed");
        assert_eq!(buf, orig);
    }
}
