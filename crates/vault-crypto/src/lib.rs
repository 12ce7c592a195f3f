//! Passphrase-based authenticated encryption for archived payloads
//!
//! Every encrypted artifact is self-describing: a fixed header carrying the
//! random salt, nonce, and authentication tag precedes the ciphertext, so
//! only the passphrase is needed to decrypt.

pub mod cipher;
pub mod error;

pub use cipher::{
    ENCRYPTED_SUFFIX, HEADER_LEN, decrypt, decrypt_file, decrypted_sibling, encrypt, encrypt_file,
    encrypted_sibling, is_encrypted_path,
};
pub use error::{Error, Result};
