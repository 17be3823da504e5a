use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// Generate a fresh item or key identifier: 32 uppercase hex characters.
pub fn new_item_id() -> String {
    Uuid::new_v4().simple().to_string().to_uppercase()
}

/// Read and parse a JSON file.
///
/// Some keychains written by old clients contain literal ` ` escapes
/// inside base64 string fields; those are stripped before parsing, matching
/// what other readers of the format do.
pub(crate) fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, FileError> {
    let raw = fs::read(path)?;
    let filtered = strip_nul_escapes(raw);
    Ok(serde_json::from_slice(&filtered)?)
}

pub(crate) fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), FileError> {
    let data = serde_json::to_vec(value)?;
    write_atomic(path, &data)?;
    Ok(())
}

/// Write a file so that readers in the same process never observe a partial
/// write: the bytes go to a sibling temp path which is then renamed over the
/// destination.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut tmp = PathBuf::from(path);
    tmp.as_mut_os_string().push(".tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}

fn strip_nul_escapes(raw: Vec<u8>) -> Vec<u8> {
    const ESCAPE: &[u8] = br"\u0000";
    if !raw.windows(ESCAPE.len()).any(|w| w == ESCAPE) {
        return raw;
    }
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i..].starts_with(ESCAPE) {
            i += ESCAPE.len();
        } else {
            out.push(raw[i]);
            i += 1;
        }
    }
    out
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum FileError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_ids_are_uppercase_hex() {
        let id = new_item_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        assert_ne!(id, new_item_id());
    }

    #[test]
    fn nul_escapes_are_stripped() {
        let raw = br#"{"data":"QUJD\u0000"}"#.to_vec();
        assert_eq!(strip_nul_escapes(raw), br#"{"data":"QUJD"}"#.to_vec());
    }

    #[test]
    fn clean_input_is_untouched() {
        let raw = br#"{"data":"QUJD"}"#.to_vec();
        assert_eq!(strip_nul_escapes(raw.clone()), raw);
    }
}
