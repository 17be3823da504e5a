use serde::{Deserialize, Serialize};

use crate::types::item_type;
use crate::util::new_item_id;

/// File extension (without dot) of per-item data files.
pub const ITEM_FILE_EXT: &str = "1password";

/// Type code of logically removed items. Tombstones keep their UUID so that
/// folder-synced replicas converge on the deletion instead of resurrecting
/// the item.
pub const TOMBSTONE_TYPE_NAME: &str = "system.Tombstone";

/// Type code of folder items.
pub const FOLDER_TYPE_NAME: &str = "system.folder.Regular";

/// A single entry in a vault, with its content still encrypted.
///
/// Items are plain data: every operation that touches the containing vault
/// (saving, decrypting, tombstoning) lives on [`crate::Vault`] and takes the
/// item as an argument.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    /// Unix timestamp of the last save.
    pub updated_at: u64,

    pub title: String,

    /// Names the key entry in `encryptionKeys.js` protecting this item.
    pub security_level: String,

    /// The item's content as a salted envelope; plaintext is the JSON form
    /// of [`crate::ItemContent`].
    #[serde(with = "crate::serde_b64", skip_serializing_if = "Vec::is_empty")]
    pub encrypted: Vec<u8>,

    /// Legacy digest over the content. Written back verbatim, never
    /// validated, empty for items created here.
    pub contents_hash: String,

    /// Type code, e.g. `webforms.WebForm`. Codes outside the standard
    /// registry round-trip untouched.
    pub type_name: String,

    /// 32 uppercase hex characters, fixed at creation.
    pub uuid: String,

    /// Unix timestamp of the first save.
    pub created_at: u64,

    /// Primary URL, kept in sync with the `website` entry of the content's
    /// URL list.
    pub location: String,

    /// UUID of the folder item containing this item, if any.
    pub folder_uuid: String,

    /// Position in the favorites list; zero when not a favorite.
    pub fave_index: i64,

    pub trashed: bool,

    pub open_contents: ItemOpenContents,
}

/// The unencrypted portion of an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemOpenContents {
    pub tags: Vec<String>,

    /// Where the item is surfaced by browser integrations: `"Always"` or
    /// `"Never"`.
    pub scope: String,
}

impl Item {
    /// Create an item shell with a fresh UUID. Content must be attached via
    /// [`crate::Vault::set_content`] before the item can be saved.
    pub fn new(title: &str, type_name: &str, security_level: &str) -> Item {
        Item {
            title: title.to_owned(),
            security_level: security_level.to_owned(),
            type_name: type_name.to_owned(),
            uuid: new_item_id(),
            ..Item::default()
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.type_name == TOMBSTONE_TYPE_NAME
    }

    pub fn is_folder(&self) -> bool {
        self.type_name == FOLDER_TYPE_NAME
    }

    /// User-presentable name of the item's type, e.g. "Credit Card".
    pub fn type_display_name(&self) -> &'static str {
        item_type(&self.type_name).map_or("Unknown", |t| t.name)
    }

    /// Attach a tag, keeping the tag list duplicate-free. Returns whether
    /// the list changed.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.open_contents.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.open_contents.tags.push(tag.to_owned());
        true
    }

    /// Remove a tag. Returns whether the list changed.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.open_contents.tags.len();
        self.open_contents.tags.retain(|t| t != tag);
        self.open_contents.tags.len() != before
    }
}
