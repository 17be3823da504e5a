#![doc = include_str!("../README.md")]

mod content;
pub use content::{
    field_value_from_string, FieldKind, FieldValue, ItemAddress, ItemContent, ItemField,
    ItemSection, ItemUrl, WebFormField, WEBSITE_URL_LABEL,
};
mod crypto_agent;
pub use crypto_agent::{CryptoAgent, InMemoryCrypto, KeyDict};
mod error;
pub use error::{NotAVaultReason, VaultError};
mod index;
pub use index::{read_index, write_index, IndexEntry, CONTENTS_FILE};
mod item;
pub use item::{Item, ItemOpenContents, FOLDER_TYPE_NAME, ITEM_FILE_EXT, TOMBSTONE_TYPE_NAME};
mod keys;
pub use keys::{
    EncryptionKeyEntry, EncryptionKeyFile, DEFAULT_PBKDF_ITERATIONS, KEYS_FILE, KEYS_PLIST_FILE,
};
mod plist;
mod search;
pub use search::ItemPattern;
pub mod serde_b64;
mod templates;
pub use templates::standard_template;
mod types;
pub use types::{all_item_types, item_type, type_code_for_alias, ItemType};
mod util;
pub use util::new_item_id;
mod vault;
pub use vault::{Vault, VaultSecurity, DATA_DIR, PASSWORD_HINT_FILE};
