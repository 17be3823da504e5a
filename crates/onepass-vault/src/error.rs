use std::path::PathBuf;

use onepass_crypto::CryptoError;
use thiserror::Error;

/// Why a path failed the vault check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotAVaultReason {
    /// The path does not exist.
    Missing,
    /// The directory name does not end in `.agilekeychain`.
    WrongExtension,
    /// The `data/default` profile directory is absent.
    NoDataDir,
}

impl std::fmt::Display for NotAVaultReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotAVaultReason::Missing => f.write_str("path does not exist"),
            NotAVaultReason::WrongExtension => {
                f.write_str("vault folder name must end with .agilekeychain")
            }
            NotAVaultReason::NoDataDir => f.write_str("unable to find data dir in vault"),
        }
    }
}

/// Errors produced by the vault engine.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("no vault at {path}: {reason}")]
    NotAVault {
        path: PathBuf,
        reason: NotAVaultReason,
    },
    #[error("vault {0} already exists")]
    VaultAlreadyExists(PathBuf),
    #[error("failed to read encryption key file: {0}")]
    EncryptionKeysUnreadable(String),
    #[error("incorrect master password")]
    BadMasterPassword,
    #[error("no encryption key with level '{0}'")]
    UnknownKeyLevel(String),
    #[error("vault is locked")]
    Locked,
    #[error("no item with ID '{0}'")]
    ItemNotFound(String),
    #[error("item content not set")]
    ItemContentMissing,
    #[error("item I/O failed: {0}")]
    ItemIo(#[from] std::io::Error),
    #[error("contents index is corrupt: {0}")]
    IndexCorrupt(String),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error("crypto failure: {0}")]
    CryptoFailure(String),
    #[error("unknown item type '{0}'")]
    UnknownItemType(String),
    #[error("invalid value for {kind} field: {message}")]
    InvalidFieldValue { kind: String, message: String },
    #[error("item data is not valid JSON: {0}")]
    ItemEncoding(#[from] serde_json::Error),
    #[error("key agent unavailable: {0}")]
    AgentUnavailable(String),
    #[error("key agent was started by a different binary version")]
    VersionMismatch,
}
