use thiserror::Error;

pub(crate) type Result<T, E = CryptoError> = std::result::Result<T, E>;

/// Errors produced by the crypto primitives.
///
/// `KeyDecrypt` is the "wrong master password" class: any failure while
/// opening a sealed item key collapses into it so that callers can tell a
/// bad password apart from structurally invalid data elsewhere.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid AES key length: {0}")]
    InvalidKeyLength(usize),
    #[error("invalid AES IV length: {0}")]
    InvalidIvLength(usize),
    #[error("invalid PKCS#7 padding")]
    InvalidPadding,
    #[error("encrypted data is missing its salt envelope")]
    BadEnvelope,
    #[error("unexpected item key length: {0}")]
    InvalidItemKeyLength(usize),
    #[error("unexpected sealed key length: {0}")]
    InvalidSealedKeyLength(usize),
    #[error("unable to decrypt key")]
    KeyDecrypt,
    #[error("generated passwords must be at least {min} characters, got {requested}")]
    PasswordTooShort { requested: usize, min: usize },
}
