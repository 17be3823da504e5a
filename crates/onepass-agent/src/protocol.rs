//! Line-delimited JSON messages exchanged over the agent socket. The
//! protocol is private to one installed binary; the version handshake in
//! [`crate::connect_or_start`] restarts agents left over from older builds.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Request {
    /// Liveness and version probe; answered without taking the state lock.
    Info,
    Unlock {
        vault_path: PathBuf,
        master_password: String,
        expire_after_secs: u64,
    },
    Lock {
        vault_path: PathBuf,
    },
    IsLocked {
        vault_path: PathBuf,
    },
    Encrypt {
        vault_path: PathBuf,
        key_level: String,
        #[serde(with = "onepass_vault::serde_b64")]
        data: Vec<u8>,
    },
    Decrypt {
        vault_path: PathBuf,
        key_level: String,
        #[serde(with = "onepass_vault::serde_b64")]
        data: Vec<u8>,
    },
    RefreshAccess {
        vault_path: PathBuf,
        expire_after_secs: u64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum Response {
    Info {
        info: AgentInfo,
    },
    Bool {
        value: bool,
    },
    Data {
        #[serde(with = "onepass_vault::serde_b64")]
        data: Vec<u8>,
    },
    Unit,
    Error {
        kind: WireErrorKind,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireErrorKind {
    NoSuchVault,
    NoSuchKey,
    NotUnlocked,
    BadMasterPassword,
    Crypto,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    pub pid: u32,

    /// Modification time of the binary, in Unix seconds; both halves of the
    /// version handshake compute this the same way.
    pub binary_version: i64,
}

/// The version stamp of the currently running binary: its file modification
/// time. Zero when the binary cannot be inspected.
pub fn binary_version() -> i64 {
    std::env::current_exe()
        .and_then(|exe| std::fs::metadata(exe))
        .and_then(|meta| meta.modified())
        .map(|mtime| chrono::DateTime::<chrono::Utc>::from(mtime).timestamp())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_round_trip_as_single_json_lines() {
        let request = Request::Encrypt {
            vault_path: PathBuf::from("/tmp/vault.agilekeychain"),
            key_level: "SL5".to_owned(),
            data: b"plaintext".to_vec(),
        };
        let line = serde_json::to_string(&request).unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains(r#""op":"encrypt""#));
        let back: Request = serde_json::from_str(&line).unwrap();
        assert!(matches!(back, Request::Encrypt { data, .. } if data == b"plaintext"));
    }

    #[test]
    fn error_responses_carry_a_kind() {
        let response = Response::Error {
            kind: WireErrorKind::NoSuchVault,
            message: "not unlocked".to_owned(),
        };
        let line = serde_json::to_string(&response).unwrap();
        assert!(line.contains(r#""kind":"noSuchVault""#));
    }

    #[test]
    fn binary_version_is_stable_within_a_process() {
        assert_eq!(binary_version(), binary_version());
    }
}
