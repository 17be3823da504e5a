use hmac::Hmac;
use md5::{Digest, Md5};
use sha1::Sha1;

use crate::AES_KEY_LEN;

type PbkdfSha1Hmac = Hmac<Sha1>;

/// Size of the PBKDF2 output block: the first half is the AES key, the
/// second half the IV used to seal item keys.
pub const DERIVED_KEY_LEN: usize = 32;

/// PBKDF2-HMAC-SHA1 derivation of the master-password key block.
pub fn pbkdf2_key(password: &[u8], salt: &[u8], iterations: u32) -> [u8; DERIVED_KEY_LEN] {
    pbkdf2::pbkdf2_array::<PbkdfSha1Hmac, DERIVED_KEY_LEN>(password, salt, iterations)
        .expect("hmac accepts any key length")
}

/// Derive an AES-128 key and IV from an arbitrary-length secret and salt
/// using the classic OpenSSL `EVP_BytesToKey` construction with MD5:
///
/// ```text
/// key = MD5(secret || salt)
/// iv  = MD5(key || secret || salt)
/// ```
pub fn openssl_kdf(secret: &[u8], salt: &[u8]) -> ([u8; AES_KEY_LEN], [u8; AES_KEY_LEN]) {
    let mut hasher = Md5::new();
    hasher.update(secret);
    hasher.update(salt);
    let key: [u8; AES_KEY_LEN] = hasher.finalize().into();

    let mut hasher = Md5::new();
    hasher.update(key);
    hasher.update(secret);
    hasher.update(salt);
    let iv: [u8; AES_KEY_LEN] = hasher.finalize().into();

    (key, iv)
}
