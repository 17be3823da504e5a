use std::fmt;
use std::path::Path;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::util::{read_json_file, write_json_file, FileError};
use crate::{Item, VaultError};

/// The vault index file: a JSON array with one positional row per item.
pub const CONTENTS_FILE: &str = "contents.js";

/// One row of `contents.js`.
///
/// The on-disk form is a positional array of at least eight elements:
/// `[uuid, typeName, title, location, updatedAt, folderUuid, 0, "N"|"Y", ...]`.
/// Element six has no known meaning and is carried through unchanged, as are
/// any trailing elements written by other clients.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub uuid: String,
    pub type_name: String,
    pub title: String,
    pub location: String,
    pub updated_at: u64,
    pub folder_uuid: String,
    pub legacy_flag: i64,
    pub trashed: bool,
    pub extra: Vec<Value>,
}

impl IndexEntry {
    /// Build the index row for an item. `legacy_flag` and `extra` start at
    /// their defaults; when rewriting an existing row the caller copies the
    /// old values over.
    pub fn from_item(item: &Item) -> IndexEntry {
        IndexEntry {
            uuid: item.uuid.clone(),
            type_name: item.type_name.clone(),
            title: item.title.clone(),
            location: item.location.clone(),
            updated_at: item.updated_at,
            folder_uuid: item.folder_uuid.clone(),
            legacy_flag: 0,
            trashed: item.trashed,
            extra: Vec::new(),
        }
    }
}

impl Serialize for IndexEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(8 + self.extra.len()))?;
        seq.serialize_element(&self.uuid)?;
        seq.serialize_element(&self.type_name)?;
        seq.serialize_element(&self.title)?;
        seq.serialize_element(&self.location)?;
        seq.serialize_element(&self.updated_at)?;
        seq.serialize_element(&self.folder_uuid)?;
        seq.serialize_element(&self.legacy_flag)?;
        seq.serialize_element(if self.trashed { "Y" } else { "N" })?;
        for value in &self.extra {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for IndexEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<IndexEntry, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = IndexEntry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an index row of at least 8 elements")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<IndexEntry, A::Error> {
                let mut elements: Vec<Value> = Vec::new();
                while let Some(value) = seq.next_element::<Value>()? {
                    elements.push(value);
                }
                if elements.len() < 8 {
                    return Err(de::Error::invalid_length(elements.len(), &self));
                }
                let extra = elements.split_off(8);
                let as_str =
                    |v: &Value| v.as_str().map(str::to_owned).unwrap_or_default();
                Ok(IndexEntry {
                    uuid: as_str(&elements[0]),
                    type_name: as_str(&elements[1]),
                    title: as_str(&elements[2]),
                    location: as_str(&elements[3]),
                    updated_at: elements[4]
                        .as_u64()
                        .or_else(|| elements[4].as_f64().map(|f| f as u64))
                        .unwrap_or_default(),
                    folder_uuid: as_str(&elements[5]),
                    legacy_flag: elements[6].as_i64().unwrap_or_default(),
                    trashed: elements[7].as_str() == Some("Y"),
                    extra,
                })
            }
        }

        deserializer.deserialize_seq(EntryVisitor)
    }
}

/// Read the whole index. A missing or unparsable file is reported as
/// [`VaultError::IndexCorrupt`]; per-row problems surface the same way via
/// the row deserializer.
pub fn read_index(data_dir: &Path) -> Result<Vec<IndexEntry>, VaultError> {
    match read_json_file(&data_dir.join(CONTENTS_FILE)) {
        Ok(entries) => Ok(entries),
        Err(FileError::Io(err)) => Err(VaultError::ItemIo(err)),
        Err(FileError::Json(err)) => Err(VaultError::IndexCorrupt(err.to_string())),
    }
}

/// Rewrite the whole index.
pub fn write_index(data_dir: &Path, entries: &[IndexEntry]) -> Result<(), VaultError> {
    write_json_file(&data_dir.join(CONTENTS_FILE), &entries).map_err(|err| match err {
        FileError::Io(err) => VaultError::ItemIo(err),
        FileError::Json(err) => VaultError::IndexCorrupt(err.to_string()),
    })
}
