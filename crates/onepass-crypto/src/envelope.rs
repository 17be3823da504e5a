use crate::{CryptoError, Result};

/// Magic prefix of OpenSSL `enc -aes-128-cbc -salt` output.
pub const SALT_MAGIC: &[u8] = b"Salted__";
/// Length of the salt following the magic.
pub const SALT_LEN: usize = 8;

/// Assemble a salted envelope: `"Salted__" || salt || ciphertext`.
pub fn pack_envelope(salt: &[u8; SALT_LEN], ciphertext: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(SALT_MAGIC.len() + SALT_LEN + ciphertext.len());
    out.extend_from_slice(SALT_MAGIC);
    out.extend_from_slice(salt);
    out.extend_from_slice(ciphertext);
    out
}

/// Split a salted envelope into `(salt, ciphertext)`.
///
/// Records written before the salted format was introduced carry no magic;
/// those are returned whole as ciphertext with an empty salt. Anything that
/// does carry the magic must be long enough to hold the salt.
pub fn unpack_envelope(data: &[u8]) -> Result<(&[u8], &[u8])> {
    if !data.starts_with(SALT_MAGIC) {
        return Ok((&[], data));
    }
    if data.len() < SALT_MAGIC.len() + SALT_LEN {
        return Err(CryptoError::BadEnvelope);
    }
    let (_, rest) = data.split_at(SALT_MAGIC.len());
    Ok(rest.split_at(SALT_LEN))
}
