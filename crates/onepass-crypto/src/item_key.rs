use zeroize::Zeroizing;

use crate::{
    aes_cbc_decrypt, aes_cbc_encrypt, openssl_kdf, pack_envelope, pbkdf2_key, rand_salt,
    unpack_envelope, CryptoError, Result, AES_BLOCK_LEN, AES_KEY_LEN, SALT_LEN, SALT_MAGIC,
};

/// Length of the random key protecting the items of one security level.
pub const ITEM_KEY_LEN: usize = 1024;

/// Length of a sealed item key: magic + salt + the padded 1024-byte key.
pub const SEALED_KEY_LEN: usize = SALT_MAGIC.len() + SALT_LEN + ITEM_KEY_LEN + AES_BLOCK_LEN;

/// A decrypted item key. The raw bytes are zeroed on drop.
#[derive(Clone)]
pub struct ItemKey(Zeroizing<Vec<u8>>);

/// An item key encrypted under a master password, together with the
/// self-referential validation record used to verify that password.
#[derive(Clone)]
pub struct SealedItemKey {
    /// `"Salted__" || salt || AES-CBC(item key)` under the PBKDF2-derived
    /// key and IV. Always [`SEALED_KEY_LEN`] bytes.
    pub data: Vec<u8>,
    /// `"Salted__" || salt || AES-CBC(item key)` under a key and IV derived
    /// from the item key itself.
    pub validation: Vec<u8>,
}

impl ItemKey {
    /// Generate a fresh random item key.
    pub fn generate() -> Self {
        ItemKey(Zeroizing::new(crate::rand_bytes(ITEM_KEY_LEN)))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ITEM_KEY_LEN {
            return Err(CryptoError::InvalidItemKeyLength(bytes.len()));
        }
        Ok(ItemKey(Zeroizing::new(bytes.to_vec())))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Encrypt item data into a salted envelope, deriving the per-envelope
    /// AES key and IV from this item key and a fresh salt.
    pub fn encrypt_data(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let salt = rand_salt();
        let (key, iv) = openssl_kdf(self.as_bytes(), &salt);
        let ciphertext = aes_cbc_encrypt(&key, plaintext, &iv)?;
        Ok(pack_envelope(&salt, &ciphertext))
    }

    /// Decrypt a salted envelope produced by [`ItemKey::encrypt_data`].
    pub fn decrypt_data(&self, envelope: &[u8]) -> Result<Vec<u8>> {
        let (salt, ciphertext) = unpack_envelope(envelope)?;
        let (key, iv) = openssl_kdf(self.as_bytes(), salt);
        aes_cbc_decrypt(&key, ciphertext, &iv)
    }

    /// Seal this item key under a master password.
    ///
    /// A fresh salt is drawn for both the key envelope and the validation
    /// record, so re-sealing the same key never produces the same bytes.
    pub fn seal(&self, master_pwd: &[u8], iterations: u32) -> Result<SealedItemKey> {
        let salt = rand_salt();
        let derived = Zeroizing::new(pbkdf2_key(master_pwd, &salt, iterations));
        let (key, iv) = derived.split_at(AES_KEY_LEN);
        let ciphertext = aes_cbc_encrypt(key, self.as_bytes(), iv)?;
        let data = pack_envelope(&salt, &ciphertext);

        let validation_salt = rand_salt();
        let (vkey, viv) = openssl_kdf(self.as_bytes(), &validation_salt);
        let validation_ct = aes_cbc_encrypt(&vkey, self.as_bytes(), &viv)?;
        let validation = pack_envelope(&validation_salt, &validation_ct);

        Ok(SealedItemKey { data, validation })
    }

    /// Recover an item key from its sealed form.
    ///
    /// Everything that can go wrong past the structural length check is
    /// indistinguishable from a wrong master password and is reported as
    /// [`CryptoError::KeyDecrypt`].
    pub fn open(master_pwd: &[u8], sealed: &SealedItemKey, iterations: u32) -> Result<Self> {
        if sealed.data.len() != SEALED_KEY_LEN {
            return Err(CryptoError::InvalidSealedKeyLength(sealed.data.len()));
        }
        let (salt, ciphertext) = unpack_envelope(&sealed.data)?;
        let derived = Zeroizing::new(pbkdf2_key(master_pwd, salt, iterations));
        let (key, iv) = derived.split_at(AES_KEY_LEN);
        let item_key = Zeroizing::new(
            aes_cbc_decrypt(key, ciphertext, iv).map_err(|_| CryptoError::KeyDecrypt)?,
        );

        let (validation_salt, validation_ct) =
            unpack_envelope(&sealed.validation).map_err(|_| CryptoError::KeyDecrypt)?;
        let (vkey, viv) = openssl_kdf(&item_key, validation_salt);
        let validation = Zeroizing::new(
            aes_cbc_decrypt(&vkey, validation_ct, &viv).map_err(|_| CryptoError::KeyDecrypt)?,
        );
        if *validation != *item_key || item_key.len() != ITEM_KEY_LEN {
            return Err(CryptoError::KeyDecrypt);
        }

        Ok(ItemKey(item_key))
    }
}

impl std::fmt::Debug for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ItemKey(..)")
    }
}
