use onepass_vault::VaultError;
use thiserror::Error;

/// Errors of the agent client and its wire protocol.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent is not reachable: {0}")]
    Unavailable(String),
    #[error("agent was started by a different binary version")]
    VersionMismatch,
    #[error("vault is not unlocked in the agent")]
    NoSuchVault,
    #[error("no such key level")]
    NoSuchKey,
    #[error("vault is not unlocked")]
    NotUnlocked,
    #[error("incorrect master password")]
    BadMasterPassword,
    #[error("crypto failure: {0}")]
    Crypto(String),
    #[error("agent protocol error: {0}")]
    Protocol(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("agent error: {0}")]
    Remote(String),
}

impl From<AgentError> for VaultError {
    fn from(err: AgentError) -> VaultError {
        match err {
            AgentError::NoSuchVault | AgentError::NotUnlocked => VaultError::Locked,
            AgentError::NoSuchKey => VaultError::UnknownKeyLevel(String::new()),
            AgentError::BadMasterPassword => VaultError::BadMasterPassword,
            AgentError::VersionMismatch => VaultError::VersionMismatch,
            AgentError::Crypto(message) => VaultError::CryptoFailure(message),
            AgentError::Unavailable(message) => VaultError::AgentUnavailable(message),
            AgentError::Io(err) => VaultError::AgentUnavailable(err.to_string()),
            AgentError::Protocol(message) | AgentError::Remote(message) => {
                VaultError::AgentUnavailable(message)
            }
        }
    }
}
