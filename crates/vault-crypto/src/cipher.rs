//! AES-256-GCM payload cipher with PBKDF2 key derivation
//!
//! Artifact wire layout, fixed-length and unencrypted header first:
//!
//! ```text
//! [salt 16][iv 16][tag 16][ciphertext]
//! ```
//!
//! The tag is detached, so the ciphertext region is exactly as long as the
//! plaintext. Salt and nonce are freshly random per call: encrypting the
//! same plaintext under the same passphrase twice yields different
//! artifacts that both decrypt back to the original.

use std::fs;
use std::path::{Path, PathBuf};

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::rand_core::{OsRng, RngCore};
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Key, Nonce, Tag};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::{Error, Result};

/// AES-256-GCM with a 16-byte nonce.
type PayloadCipher = AesGcm<Aes256, U16>;

/// Random salt length in the artifact header
const SALT_LEN: usize = 16;
/// Nonce length in the artifact header
const IV_LEN: usize = 16;
/// GCM authentication tag length in the artifact header
const TAG_LEN: usize = 16;
/// Total fixed header length preceding the ciphertext
pub const HEADER_LEN: usize = SALT_LEN + IV_LEN + TAG_LEN;

/// Derived key length (AES-256)
const KEY_LEN: usize = 32;
/// PBKDF2-HMAC-SHA256 iteration count. Deliberately slow.
const PBKDF2_ROUNDS: u32 = 100_000;

/// Suffix appended to the original file name of encrypted artifacts
pub const ENCRYPTED_SUFFIX: &str = ".enc";

/// Derive the symmetric key from the passphrase and a per-call salt.
fn derive_key(passphrase: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);
    key
}

/// Encrypt a byte buffer under a passphrase.
///
/// A fresh random salt and nonce are generated for every call.
pub fn encrypt(plaintext: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(passphrase, &salt);
    let cipher = PayloadCipher::new(Key::<PayloadCipher>::from_slice(&key));

    let mut buffer = plaintext.to_vec();
    let nonce = Nonce::<U16>::from_slice(&iv);
    let tag = cipher
        .encrypt_in_place_detached(nonce, b"", &mut buffer)
        .map_err(|e| Error::Encryption(e.to_string()))?;

    let mut artifact = Vec::with_capacity(HEADER_LEN + buffer.len());
    artifact.extend_from_slice(&salt);
    artifact.extend_from_slice(&iv);
    artifact.extend_from_slice(&tag);
    artifact.extend_from_slice(&buffer);
    Ok(artifact)
}

/// Decrypt an artifact produced by [`encrypt`].
///
/// # Errors
///
/// [`Error::MalformedArtifact`] when the artifact is shorter than the fixed
/// header; [`Error::AuthenticationFailed`] when the tag does not verify
/// (wrong passphrase or corruption, indistinguishable).
pub fn decrypt(artifact: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    if artifact.len() < HEADER_LEN {
        return Err(Error::MalformedArtifact {
            len: artifact.len(),
            expected: HEADER_LEN,
        });
    }

    let (salt, rest) = artifact.split_at(SALT_LEN);
    let (iv, rest) = rest.split_at(IV_LEN);
    let (tag, ciphertext) = rest.split_at(TAG_LEN);

    let key = derive_key(passphrase, salt);
    let cipher = PayloadCipher::new(Key::<PayloadCipher>::from_slice(&key));

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::<U16>::from_slice(iv),
            b"",
            &mut buffer,
            Tag::from_slice(tag),
        )
        .map_err(|_| Error::AuthenticationFailed)?;

    Ok(buffer)
}

/// Encrypt a file's contents into `dest`.
pub fn encrypt_file(source: &Path, dest: &Path, passphrase: &str) -> Result<()> {
    let plaintext = fs::read(source).map_err(|e| Error::io(source, e))?;
    let artifact = encrypt(&plaintext, passphrase)?;
    fs::write(dest, artifact).map_err(|e| Error::io(dest, e))?;
    Ok(())
}

/// Decrypt an artifact file into `dest`.
pub fn decrypt_file(source: &Path, dest: &Path, passphrase: &str) -> Result<()> {
    let artifact = fs::read(source).map_err(|e| Error::io(source, e))?;
    let plaintext = decrypt(&artifact, passphrase)?;
    fs::write(dest, plaintext).map_err(|e| Error::io(dest, e))?;
    Ok(())
}

/// Whether a path carries the encrypted-artifact suffix.
pub fn is_encrypted_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(ENCRYPTED_SUFFIX))
}

/// The encrypted sibling of a plaintext path (`file.json` -> `file.json.enc`).
pub fn encrypted_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}", name, ENCRYPTED_SUFFIX))
}

/// The plaintext sibling of an encrypted path, or `None` if the path does
/// not carry the suffix.
pub fn decrypted_sibling(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stripped = name.strip_suffix(ENCRYPTED_SUFFIX)?;
    if stripped.is_empty() {
        return None;
    }
    Some(path.with_file_name(stripped))
}
