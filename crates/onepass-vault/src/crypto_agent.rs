use std::collections::HashMap;

use onepass_crypto::ItemKey;

use crate::VaultError;

/// Decrypted item keys for one vault, keyed by security level.
pub type KeyDict = HashMap<String, ItemKey>;

/// The capability used by the vault to encrypt and decrypt item content.
///
/// Decrypted item keys can live either in the current process (short-lived
/// command invocations) or in a long-lived key agent reached over a local
/// socket; both sides of that choice implement this trait.
pub trait CryptoAgent: Send {
    /// Encrypt item data with the key named by `key_level`.
    fn encrypt(&self, key_level: &str, data: &[u8]) -> Result<Vec<u8>, VaultError>;

    /// Decrypt item data with the key named by `key_level`.
    fn decrypt(&self, key_level: &str, data: &[u8]) -> Result<Vec<u8>, VaultError>;

    /// Forget all decrypted keys. Afterwards [`CryptoAgent::is_locked`]
    /// reports `true`.
    fn lock(&mut self) -> Result<(), VaultError>;

    fn is_locked(&self) -> bool;
}

/// [`CryptoAgent`] holding decrypted keys in process memory.
pub struct InMemoryCrypto {
    keys: Option<KeyDict>,
}

impl InMemoryCrypto {
    pub fn new(keys: KeyDict) -> Self {
        InMemoryCrypto { keys: Some(keys) }
    }

    fn keys(&self) -> Result<&KeyDict, VaultError> {
        self.keys.as_ref().ok_or(VaultError::Locked)
    }

    fn key(&self, key_level: &str) -> Result<&ItemKey, VaultError> {
        self.keys()?
            .get(key_level)
            .ok_or_else(|| VaultError::UnknownKeyLevel(key_level.to_owned()))
    }
}

impl CryptoAgent for InMemoryCrypto {
    fn encrypt(&self, key_level: &str, data: &[u8]) -> Result<Vec<u8>, VaultError> {
        Ok(self.key(key_level)?.encrypt_data(data)?)
    }

    fn decrypt(&self, key_level: &str, data: &[u8]) -> Result<Vec<u8>, VaultError> {
        Ok(self.key(key_level)?.decrypt_data(data)?)
    }

    fn lock(&mut self) -> Result<(), VaultError> {
        self.keys = None;
        Ok(())
    }

    fn is_locked(&self) -> bool {
        self.keys.is_none()
    }
}
