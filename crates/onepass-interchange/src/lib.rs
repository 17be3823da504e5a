#![doc = include_str!("../README.md")]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use onepass_vault::{Item, ItemContent, Vault, VaultError};

/// Name of the record stream inside a `.1pif` bundle directory.
pub const EXPORT_DATA_FILE: &str = "data.1pif";

/// Required suffix of export bundle paths.
pub const EXPORT_EXT: &str = "1pif";

/// One interchange record: the item's plain fields together with its
/// decrypted content. The `encrypted` blob is stripped on export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedItem {
    #[serde(flatten)]
    pub item: Item,

    #[serde(rename = "secureContents", default)]
    pub secure_contents: ItemContent,
}

#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("export path must have a .{EXPORT_EXT} suffix")]
    NotAnExportPath,
    #[error("failed to parse interchange data: {0}")]
    ImportParse(String),
    #[error("failed to encode item: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Vault(#[from] VaultError),
}

/// Export items as an unencrypted `.1pif` bundle.
///
/// The bundle directory is created; each item's content is decrypted
/// through the (unlocked) vault and written as one JSON record followed by
/// a `***<uuid>***` separator line. One fresh session UUID is used for the
/// whole export.
pub fn export_items(vault: &Vault, items: &[Item], path: &Path) -> Result<(), InterchangeError> {
    if path.extension().and_then(|e| e.to_str()) != Some(EXPORT_EXT) {
        return Err(InterchangeError::NotAnExportPath);
    }
    fs::create_dir(path)?;

    let session_uuid = Uuid::new_v4();
    let mut data = String::new();
    for (i, item) in items.iter().enumerate() {
        let secure_contents = vault.content(item)?;
        let mut stripped = item.clone();
        stripped.encrypted = Vec::new();
        let record = ExportedItem {
            item: stripped,
            secure_contents,
        };
        if i > 0 {
            data.push('\n');
        }
        data.push_str(&serde_json::to_string(&record)?);
        data.push_str(&format!("\n***{session_uuid}***"));
    }

    fs::write(path.join(EXPORT_DATA_FILE), data)?;
    Ok(())
}

/// Read an interchange bundle without touching any vault.
///
/// `path` may be the `.1pif` directory or the record file itself. Records
/// are separated by `***<uuid>***` lines; separators with differing session
/// UUIDs are accepted, since bundles are sometimes concatenated.
pub fn import_items(path: &Path) -> Result<Vec<ExportedItem>, InterchangeError> {
    let data_path = if path.is_dir() {
        path.join(EXPORT_DATA_FILE)
    } else {
        PathBuf::from(path)
    };
    let data = fs::read_to_string(&data_path)?;

    let separator =
        Regex::new(r"\s*\*{3}[0-9a-f\-]{36}\*{3}\s*").expect("separator pattern is valid");
    let mut items = Vec::new();
    for record in separator.split(&data) {
        if record.is_empty() {
            continue;
        }
        let item: ExportedItem = serde_json::from_str(record)
            .map_err(|err| InterchangeError::ImportParse(err.to_string()))?;
        items.push(item);
    }
    Ok(items)
}

/// Import a bundle into a vault: every record becomes a newly added item
/// with a fresh UUID, encrypted under the vault's default key.
pub fn import_into(vault: &Vault, path: &Path) -> Result<Vec<Item>, InterchangeError> {
    let mut added = Vec::new();
    for record in import_items(path)? {
        let item = vault.add_item(
            &record.item.title,
            &record.item.type_name,
            &record.secure_contents,
        )?;
        added.push(item);
    }
    Ok(added)
}
