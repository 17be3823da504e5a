use rand::{rngs::OsRng, RngCore};

use crate::SALT_LEN;

/// Fill a buffer with bytes from the operating system CSPRNG.
///
/// Running out of system randomness is unrecoverable, so this panics rather
/// than returning an error.
pub fn rand_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    OsRng.fill_bytes(&mut buf);
    buf
}

/// Draw a fresh 8-byte envelope salt.
pub fn rand_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}
