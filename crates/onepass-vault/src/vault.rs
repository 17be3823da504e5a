use std::collections::{BTreeSet, HashSet};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::index::{read_index, write_index, IndexEntry};
use crate::keys::{EncryptionKeyEntry, EncryptionKeyFile, DEFAULT_PBKDF_ITERATIONS};
use crate::util::{read_json_file, write_atomic, FileError};
use crate::{
    CryptoAgent, InMemoryCrypto, Item, ItemContent, ItemPattern, NotAVaultReason, VaultError,
    ITEM_FILE_EXT, TOMBSTONE_TYPE_NAME,
};

/// Profile directory inside the vault; the format defines a single profile.
pub const DATA_DIR: &str = "data/default";

/// Optional plain-text password hint, shown after a failed unlock.
pub const PASSWORD_HINT_FILE: &str = ".password.hint";

const VAULT_EXT: &str = "agilekeychain";

/// Security settings for a new vault.
#[derive(Debug, Clone)]
pub struct VaultSecurity {
    pub master_password: String,

    /// PBKDF2 iteration count; `0` selects [`DEFAULT_PBKDF_ITERATIONS`].
    pub iterations: u32,
}

impl VaultSecurity {
    pub fn new(master_password: &str) -> VaultSecurity {
        VaultSecurity {
            master_password: master_password.to_owned(),
            iterations: 0,
        }
    }
}

/// An Agile Keychain vault on disk.
///
/// A vault starts out locked. [`Vault::unlock`] decrypts the item keys into
/// process memory; alternatively an external [`CryptoAgent`] (the key agent
/// client) can be attached so decrypted keys never enter this process.
pub struct Vault {
    path: PathBuf,
    agent: Option<Box<dyn CryptoAgent>>,
}

impl Vault {
    /// Verify that `path` looks like a supported vault.
    pub fn check(path: &Path) -> Result<(), VaultError> {
        let reason = if !path.exists() {
            Some(NotAVaultReason::Missing)
        } else if path.extension() != Some(OsStr::new(VAULT_EXT)) {
            Some(NotAVaultReason::WrongExtension)
        } else if !path.join(DATA_DIR).is_dir() {
            Some(NotAVaultReason::NoDataDir)
        } else {
            None
        };
        match reason {
            Some(reason) => Err(VaultError::NotAVault {
                path: path.to_owned(),
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Create a new vault at `path` with a single default-security key
    /// sealed under the given master password. The returned vault is locked.
    pub fn create(path: &Path, security: &VaultSecurity) -> Result<Vault, VaultError> {
        if path.extension() != Some(OsStr::new(VAULT_EXT)) {
            return Err(VaultError::NotAVault {
                path: path.to_owned(),
                reason: NotAVaultReason::WrongExtension,
            });
        }
        if path.exists() {
            return Err(VaultError::VaultAlreadyExists(path.to_owned()));
        }

        let data_dir = path.join(DATA_DIR);
        fs::create_dir_all(&data_dir)?;
        write_index(&data_dir, &[])?;

        let iterations = match security.iterations {
            0 => DEFAULT_PBKDF_ITERATIONS,
            n => n,
        };
        let entry = EncryptionKeyEntry::generate(&security.master_password, "SL5", iterations)?;
        let keys = EncryptionKeyFile {
            sl5: entry.identifier.clone(),
            list: vec![entry],
        };
        keys.save(&data_dir)?;

        Ok(Vault {
            path: path.to_owned(),
            agent: None,
        })
    }

    /// Open an existing vault. The vault is locked until
    /// [`Vault::unlock`] or [`Vault::attach_agent`] is called.
    pub fn open(path: &Path) -> Result<Vault, VaultError> {
        Vault::check(path)?;
        Ok(Vault {
            path: path.to_owned(),
            agent: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the profile directory holding the item and key files.
    pub fn data_dir(&self) -> PathBuf {
        self.path.join(DATA_DIR)
    }

    fn item_path(&self, uuid: &str) -> PathBuf {
        self.data_dir().join(format!("{uuid}.{ITEM_FILE_EXT}"))
    }

    fn agent(&self) -> Result<&dyn CryptoAgent, VaultError> {
        match &self.agent {
            Some(agent) if !agent.is_locked() => Ok(agent.as_ref()),
            _ => Err(VaultError::Locked),
        }
    }

    /// Decrypt the vault's item keys with the master password and hold them
    /// in process memory.
    pub fn unlock(&mut self, master_pwd: &str) -> Result<(), VaultError> {
        let keys = EncryptionKeyFile::load(&self.data_dir())?.unlock(master_pwd)?;
        self.agent = Some(Box::new(InMemoryCrypto::new(keys)));
        Ok(())
    }

    /// Use an external crypto agent (typically the key-agent client) in
    /// place of in-process keys.
    pub fn attach_agent(&mut self, agent: Box<dyn CryptoAgent>) {
        self.agent = Some(agent);
    }

    /// Drop all decrypted key material.
    pub fn lock(&mut self) -> Result<(), VaultError> {
        if let Some(agent) = &mut self.agent {
            agent.lock()?;
        }
        self.agent = None;
        Ok(())
    }

    pub fn is_locked(&self) -> bool {
        self.agent.as_ref().map_or(true, |agent| agent.is_locked())
    }

    /// The user-provided password hint, if one was recorded.
    pub fn password_hint(&self) -> Result<String, VaultError> {
        Ok(fs::read_to_string(self.data_dir().join(PASSWORD_HINT_FILE))?)
    }

    pub fn set_password_hint(&self, hint: &str) -> Result<(), VaultError> {
        write_atomic(&self.data_dir().join(PASSWORD_HINT_FILE), hint.as_bytes())?;
        Ok(())
    }

    /// Change the master password: every key entry is re-sealed under the
    /// new password at its existing iteration count, and both key files are
    /// rewritten.
    pub fn set_master_password(
        &self,
        current_pwd: &str,
        new_pwd: &str,
    ) -> Result<(), VaultError> {
        let data_dir = self.data_dir();
        let mut keys = EncryptionKeyFile::load(&data_dir)?;
        for entry in &mut keys.list {
            entry.reseal(current_pwd, new_pwd)?;
        }
        keys.save(&data_dir)
    }

    /// The security level assigned to newly added items.
    pub fn default_security_level(&self) -> Result<String, VaultError> {
        Ok(EncryptionKeyFile::load(&self.data_dir())?.default_level())
    }

    /// Create, encrypt and save a new item. Requires the vault to be
    /// unlocked.
    pub fn add_item(
        &self,
        title: &str,
        type_name: &str,
        content: &ItemContent,
    ) -> Result<Item, VaultError> {
        let level = self.default_security_level()?;
        let mut item = Item::new(title, type_name, &level);
        self.set_content(&mut item, content)?;
        self.save_item(&mut item)?;
        Ok(item)
    }

    /// Write an item to disk and update the index.
    ///
    /// `updatedAt` is bumped to now, and `createdAt` is set on the first
    /// save. The item file is written before its index row so that a reader
    /// of the index never finds the file missing.
    pub fn save_item(&self, item: &mut Item) -> Result<(), VaultError> {
        if item.encrypted.is_empty() {
            return Err(VaultError::ItemContentMissing);
        }
        item.updated_at = unix_now();
        if item.created_at == 0 {
            item.created_at = item.updated_at;
        }

        let data = serde_json::to_vec(item)?;
        write_atomic(&self.item_path(&item.uuid), &data)?;

        let data_dir = self.data_dir();
        let mut entries = read_index(&data_dir)?;
        let mut row = IndexEntry::from_item(item);
        if let Some(existing) = entries.iter_mut().find(|e| e.uuid == item.uuid) {
            // keep the parts of the row this client does not interpret
            row.legacy_flag = existing.legacy_flag;
            row.extra = std::mem::take(&mut existing.extra);
            *existing = row;
        } else {
            entries.push(row);
        }
        write_index(&data_dir, &entries)
    }

    /// Load a single item by UUID. The content stays encrypted.
    pub fn load_item(&self, uuid: &str) -> Result<Item, VaultError> {
        match read_json_file(&self.item_path(uuid)) {
            Ok(item) => Ok(item),
            Err(FileError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                Err(VaultError::ItemNotFound(uuid.to_owned()))
            }
            Err(FileError::Io(err)) => Err(VaultError::ItemIo(err)),
            Err(FileError::Json(err)) => Err(VaultError::ItemEncoding(err)),
        }
    }

    /// List all live items. Tombstones are filtered out, unreadable files
    /// are skipped with a warning, and item files without an index row are
    /// treated as orphans and skipped.
    pub fn list_items(&self) -> Result<Vec<Item>, VaultError> {
        let data_dir = self.data_dir();
        let indexed: HashSet<String> = read_index(&data_dir)?
            .into_iter()
            .map(|entry| entry.uuid)
            .collect();

        let mut items = Vec::new();
        for dir_entry in fs::read_dir(&data_dir)? {
            let path = dir_entry?.path();
            if path.extension() != Some(OsStr::new(ITEM_FILE_EXT)) {
                continue;
            }
            let item: Item = match read_json_file(&path) {
                Ok(item) => item,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable item");
                    continue;
                }
            };
            if item.type_name == TOMBSTONE_TYPE_NAME {
                continue;
            }
            if !indexed.contains(&item.uuid) {
                warn!(uuid = %item.uuid, "skipping orphaned item with no index row");
                continue;
            }
            items.push(item);
        }
        Ok(items)
    }

    /// List the live items matching a search pattern.
    pub fn find_items(&self, pattern: &ItemPattern) -> Result<Vec<Item>, VaultError> {
        Ok(self
            .list_items()?
            .into_iter()
            .filter(|item| pattern.matches(item))
            .collect())
    }

    /// List the folder items of the vault.
    pub fn list_folders(&self) -> Result<Vec<Item>, VaultError> {
        Ok(self
            .list_items()?
            .into_iter()
            .filter(Item::is_folder)
            .collect())
    }

    /// List the live items filed under the given folder.
    pub fn items_in_folder(&self, folder_uuid: &str) -> Result<Vec<Item>, VaultError> {
        Ok(self
            .list_items()?
            .into_iter()
            .filter(|item| item.folder_uuid == folder_uuid)
            .collect())
    }

    /// All tags in use across the vault, sorted and de-duplicated.
    pub fn list_tags(&self) -> Result<Vec<String>, VaultError> {
        let tags: BTreeSet<String> = self
            .list_items()?
            .into_iter()
            .flat_map(|item| item.open_contents.tags)
            .collect();
        Ok(tags.into_iter().collect())
    }

    /// Encrypt `content` into the item. If the content carries a `website`
    /// URL the item's `location` is updated to match.
    pub fn set_content(&self, item: &mut Item, content: &ItemContent) -> Result<(), VaultError> {
        if let Some(url) = content.website() {
            item.location = url.to_owned();
        }
        let plaintext = serde_json::to_vec(content)?;
        item.encrypted = self.agent()?.encrypt(&item.security_level, &plaintext)?;
        Ok(())
    }

    /// Encrypt a raw JSON document into the item. The input must be valid
    /// JSON but is stored byte-for-byte.
    pub fn set_content_json(&self, item: &mut Item, content: &str) -> Result<(), VaultError> {
        serde_json::from_str::<serde_json::Value>(content)?;
        item.encrypted = self.agent()?.encrypt(&item.security_level, content.as_bytes())?;
        Ok(())
    }

    /// Decrypt and parse the item's content.
    pub fn content(&self, item: &Item) -> Result<ItemContent, VaultError> {
        let plaintext = self.decrypt_content(item)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }

    /// Decrypt the item's content and return it as a JSON string.
    pub fn content_json(&self, item: &Item) -> Result<String, VaultError> {
        let plaintext = self.decrypt_content(item)?;
        Ok(String::from_utf8_lossy(&plaintext).into_owned())
    }

    fn decrypt_content(&self, item: &Item) -> Result<Vec<u8>, VaultError> {
        if item.encrypted.len() < 16 {
            return Err(VaultError::ItemContentMissing);
        }
        self.agent()?.decrypt(&item.security_level, &item.encrypted)
    }

    /// Logically remove an item: the file and its index row stay, but the
    /// item becomes a tombstone with empty content, keeping the UUID stable
    /// for replicas that sync the vault directory.
    pub fn remove_item(&self, item: &mut Item) -> Result<(), VaultError> {
        item.type_name = TOMBSTONE_TYPE_NAME.to_owned();
        item.title = "Unnamed".to_owned();
        item.trashed = true;
        self.set_content(item, &ItemContent::default())?;
        self.save_item(item)
    }

    /// Move an item to the trash.
    pub fn trash_item(&self, item: &mut Item) -> Result<(), VaultError> {
        item.trashed = true;
        self.save_item(item)
    }

    /// Bring an item back from the trash.
    pub fn restore_item(&self, item: &mut Item) -> Result<(), VaultError> {
        item.trashed = false;
        self.save_item(item)
    }

    pub fn rename_item(&self, item: &mut Item, new_title: &str) -> Result<(), VaultError> {
        item.title = new_title.to_owned();
        self.save_item(item)
    }

    /// File the item under a folder item, or under no folder when
    /// `folder_uuid` is empty.
    pub fn move_to_folder(&self, item: &mut Item, folder_uuid: &str) -> Result<(), VaultError> {
        item.folder_uuid = folder_uuid.to_owned();
        self.save_item(item)
    }

    /// Add a tag to an item and save it. Adding an existing tag is a no-op.
    pub fn tag_item(&self, item: &mut Item, tag: &str) -> Result<(), VaultError> {
        if item.add_tag(tag) {
            self.save_item(item)?;
        }
        Ok(())
    }

    /// Remove a tag from an item and save it.
    pub fn untag_item(&self, item: &mut Item, tag: &str) -> Result<(), VaultError> {
        if item.remove_tag(tag) {
            self.save_item(item)?;
        }
        Ok(())
    }
}

fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
