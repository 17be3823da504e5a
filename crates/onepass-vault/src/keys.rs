use std::path::Path;

use onepass_crypto::{CryptoError, ItemKey, SealedItemKey, SEALED_KEY_LEN};
use serde::{Deserialize, Serialize};

use crate::plist::{marshal_plist, PlistValue};
use crate::util::{new_item_id, read_json_file, write_atomic, write_json_file};
use crate::{KeyDict, VaultError};

/// JSON file holding the sealed item keys.
pub const KEYS_FILE: &str = "encryptionKeys.js";
/// XML plist mirror of [`KEYS_FILE`], rewritten on every change.
pub const KEYS_PLIST_FILE: &str = "1password.keys";

/// PBKDF2 iteration count used for new vaults, matching what contemporary
/// writers of the format produce.
pub const DEFAULT_PBKDF_ITERATIONS: u32 = 17094;

/// One sealed item key in `encryptionKeys.js`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionKeyEntry {
    /// The item key sealed under the master password:
    /// `"Salted__" || salt || ciphertext`, 1056 bytes.
    #[serde(with = "crate::serde_b64")]
    pub data: Vec<u8>,

    /// Random UUID naming this entry; the file-level `SL5` field refers to
    /// one of these.
    pub identifier: String,

    /// PBKDF2 iteration count for the master-password derivation.
    pub iterations: u32,

    /// Security level label, referenced by each item's `securityLevel`.
    pub level: String,

    /// Copy of the item key encrypted with a key derived from itself; used
    /// to tell a wrong master password apart from damaged data.
    #[serde(with = "crate::serde_b64")]
    pub validation: Vec<u8>,
}

/// The parsed `encryptionKeys.js` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncryptionKeyFile {
    pub list: Vec<EncryptionKeyEntry>,

    /// Identifier of the default-security key entry.
    #[serde(rename = "SL5", default)]
    pub sl5: String,
}

impl EncryptionKeyEntry {
    /// Create a new entry with a fresh random item key sealed under
    /// `master_pwd`.
    pub fn generate(
        master_pwd: &str,
        level: &str,
        iterations: u32,
    ) -> Result<EncryptionKeyEntry, VaultError> {
        let key = ItemKey::generate();
        let sealed = key.seal(master_pwd.as_bytes(), iterations)?;
        Ok(EncryptionKeyEntry {
            data: sealed.data,
            identifier: new_item_id(),
            iterations,
            level: level.to_owned(),
            validation: sealed.validation,
        })
    }

    /// Decrypt this entry's item key with the master password.
    pub fn open(&self, master_pwd: &str) -> Result<ItemKey, VaultError> {
        if self.data.len() != SEALED_KEY_LEN {
            return Err(VaultError::EncryptionKeysUnreadable(format!(
                "unexpected encrypted key length: {}",
                self.data.len()
            )));
        }
        let sealed = SealedItemKey {
            data: self.data.clone(),
            validation: self.validation.clone(),
        };
        ItemKey::open(master_pwd.as_bytes(), &sealed, self.iterations).map_err(|err| match err {
            CryptoError::KeyDecrypt => VaultError::BadMasterPassword,
            other => VaultError::Crypto(other),
        })
    }

    /// Re-seal this entry's item key under a new master password, keeping
    /// the iteration count and drawing fresh salts.
    pub fn reseal(&mut self, current_pwd: &str, new_pwd: &str) -> Result<(), VaultError> {
        let key = self.open(current_pwd)?;
        let sealed = key.seal(new_pwd.as_bytes(), self.iterations)?;
        self.data = sealed.data;
        self.validation = sealed.validation;
        Ok(())
    }

    fn to_plist(&self) -> PlistValue {
        PlistValue::Dict(vec![
            ("data".to_owned(), PlistValue::Data(self.data.clone())),
            (
                "identifier".to_owned(),
                PlistValue::String(self.identifier.clone()),
            ),
            (
                "iterations".to_owned(),
                PlistValue::Integer(i64::from(self.iterations)),
            ),
            ("level".to_owned(), PlistValue::String(self.level.clone())),
            (
                "validation".to_owned(),
                PlistValue::Data(self.validation.clone()),
            ),
        ])
    }
}

impl EncryptionKeyFile {
    /// Read the key file from a vault data directory.
    pub fn load(data_dir: &Path) -> Result<EncryptionKeyFile, VaultError> {
        read_json_file(&data_dir.join(KEYS_FILE))
            .map_err(|err| VaultError::EncryptionKeysUnreadable(err.to_string()))
    }

    /// Write the key file and its plist mirror.
    pub fn save(&self, data_dir: &Path) -> Result<(), VaultError> {
        write_json_file(&data_dir.join(KEYS_FILE), self)
            .map_err(|err| VaultError::EncryptionKeysUnreadable(err.to_string()))?;
        let plist = marshal_plist(&self.to_plist());
        write_atomic(&data_dir.join(KEYS_PLIST_FILE), plist.as_bytes())?;
        Ok(())
    }

    /// Decrypt every entry with the master password, producing the
    /// level-to-key dictionary used to unlock the vault.
    pub fn unlock(&self, master_pwd: &str) -> Result<KeyDict, VaultError> {
        let mut keys = KeyDict::new();
        for entry in &self.list {
            keys.insert(entry.level.clone(), entry.open(master_pwd)?);
        }
        Ok(keys)
    }

    /// The security level new items should use: the level of the entry the
    /// `SL5` field names, or the conventional label when the file does not
    /// say.
    pub fn default_level(&self) -> String {
        self.list
            .iter()
            .find(|entry| entry.identifier == self.sl5)
            .or_else(|| self.list.first())
            .map(|entry| entry.level.clone())
            .unwrap_or_else(|| "SL5".to_owned())
    }

    fn to_plist(&self) -> PlistValue {
        PlistValue::Dict(vec![
            (
                "list".to_owned(),
                PlistValue::Array(self.list.iter().map(EncryptionKeyEntry::to_plist).collect()),
            ),
            ("SL5".to_owned(), PlistValue::String(self.sl5.clone())),
        ])
    }
}
