//! RSA
//!
//! - 随机选择两个质数$p$和$q$($p\neq q$), 则模数$n=p*q$. 模数的字节长度$k$满足: $2^{(k-1)*8}\le n \lt 2^{k*8}$;
//! - 公钥指数$e$为奇数, $3 \le e \lt n$, 且和$p-1$及$q-1$都互质;
//! - 私钥的指数部分$d$满足: $d*e \equiv 1 \mod \mathrm{lcm}(p-1, q-1)$;
//!
//! 加密: $y = x ^ e \mod n$;
//!
//! 解密: $y = x^d \mod n$, 经CRT计算, 并做盲化和结果校验;
//!
//! 原理: 欧拉定理$a^{\phi(n)} \equiv 1 \mod n$
//! - $x ^ {k(p-1)(q-1)+1} \equiv x \mod n$
//!

#[cfg(feature = "sec-zeroize")]
pub(crate) type SecretBytes = zeroize::Zeroizing<Vec<u8>>;
#[cfg(not(feature = "sec-zeroize"))]
pub(crate) type SecretBytes = Vec<u8>;

mod key;
pub use key::{PrivateKey, PublicKey};

mod format;
pub use format::{Key, KeyEncoding, KeyFormat, KeyPolicy, KeySyntax};

mod generate;
pub use generate::{generate_key, generate_key_with_rng, KeyGenParams, MIN_PRIME_TEST_ROUNDS};

mod mgf;

mod oaep;
pub use oaep::{OAEPDecrypt, OAEPEncrypt};

mod pkcs1;
pub use pkcs1::{PKCS1Decrypt, PKCS1Encrypt};

mod pkcs1_sig;
pub use pkcs1_sig::{PKCS1Sign, PKCS1Verify};

mod pss;
pub use pss::{PSSSign, PSSVerify, SaltLength};

mod scheme;
pub use scheme::{
    decrypt_with_rng, encrypt_with_rng, sign_with_rng, verify, EncryptionScheme, SignatureScheme,
};
