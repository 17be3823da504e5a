use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::{CryptoError, Result};

/// AES-128 key length in bytes.
pub const AES_KEY_LEN: usize = 16;
/// AES block length in bytes. PKCS#7 padding always rounds plaintext up to
/// the next multiple of this.
pub const AES_BLOCK_LEN: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

fn check_lengths(key: &[u8], iv: &[u8]) -> Result<()> {
    if key.len() != AES_KEY_LEN {
        return Err(CryptoError::InvalidKeyLength(key.len()));
    }
    if iv.len() != AES_BLOCK_LEN {
        return Err(CryptoError::InvalidIvLength(iv.len()));
    }
    Ok(())
}

/// Encrypt `plaintext` with AES-128-CBC, padding with PKCS#7.
///
/// The output is always a non-empty multiple of [`AES_BLOCK_LEN`] and
/// strictly longer than the input.
pub fn aes_cbc_encrypt(key: &[u8], plaintext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    check_lengths(key, iv)?;
    let cipher = Aes128CbcEnc::new_from_slices(key, iv)
        .map_err(|_| CryptoError::InvalidKeyLength(key.len()))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt AES-128-CBC ciphertext and strip the PKCS#7 padding.
///
/// Padding bytes naming a length outside `1..=16` are rejected as
/// [`CryptoError::InvalidPadding`].
pub fn aes_cbc_decrypt(key: &[u8], ciphertext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    check_lengths(key, iv)?;
    if ciphertext.is_empty() || ciphertext.len() % AES_BLOCK_LEN != 0 {
        return Err(CryptoError::InvalidPadding);
    }
    let cipher = Aes128CbcDec::new_from_slices(key, iv)
        .map_err(|_| CryptoError::InvalidKeyLength(key.len()))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::InvalidPadding)
}
