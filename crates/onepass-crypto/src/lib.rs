#![doc = include_str!("../README.md")]

mod aes_cbc;
pub use aes_cbc::{aes_cbc_decrypt, aes_cbc_encrypt, AES_BLOCK_LEN, AES_KEY_LEN};
mod envelope;
pub use envelope::{pack_envelope, unpack_envelope, SALT_LEN, SALT_MAGIC};
mod error;
pub use error::CryptoError;
pub(crate) use error::Result;
mod item_key;
pub use item_key::{ItemKey, SealedItemKey, ITEM_KEY_LEN, SEALED_KEY_LEN};
mod kdf;
pub use kdf::{openssl_kdf, pbkdf2_key, DERIVED_KEY_LEN};
mod password;
pub use password::{gen_password, MIN_PASSWORD_LEN};
mod util;
pub use util::{rand_bytes, rand_salt};
