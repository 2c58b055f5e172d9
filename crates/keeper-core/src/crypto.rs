//! Field sealing with AES-256-GCM under a passphrase-derived key.
//!
//! The key is SHA-256 of the passphrase. The nonce is not random: it is the
//! last 12 bytes of the key, so sealing is deterministic and the output is
//! just `ciphertext || tag`, hex-encoded in lowercase. Every field of every
//! secret kind goes through [`seal`] on the client before it is sent and
//! through [`open`] after it is received; the server never calls either.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{KeeperError, Result};

const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;

/// Derive the cipher key from `passphrase`.
fn derive_key(passphrase: &str) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    if passphrase.is_empty() {
        return Err(KeeperError::Validation(
            "passphrase must not be empty".to_string(),
        ));
    }
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    key.copy_from_slice(&Sha256::digest(passphrase.as_bytes()));
    Ok(key)
}

fn cipher_for(key: &[u8; KEY_SIZE]) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key).map_err(|e| KeeperError::Encryption(e.to_string()))
}

/// Seal `plaintext` under `passphrase`, returning lowercase hex.
///
/// The same passphrase and plaintext always produce the same output.
pub fn seal(passphrase: &str, plaintext: &str) -> Result<String> {
    let key = derive_key(passphrase)?;
    let cipher = cipher_for(&key)?;
    let nonce = Nonce::from_slice(&key[KEY_SIZE - NONCE_SIZE..]);

    let sealed = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| KeeperError::Encryption(e.to_string()))?;

    Ok(hex::encode(sealed))
}

/// Open hex produced by [`seal`] with the same passphrase.
///
/// Fails with [`KeeperError::Decode`] when `ciphertext_hex` is not hex and
/// with [`KeeperError::Authentication`] when the tag does not verify, which
/// covers both a wrong passphrase and a tampered ciphertext.
pub fn open(passphrase: &str, ciphertext_hex: &str) -> Result<String> {
    let sealed = hex::decode(ciphertext_hex)
        .map_err(|e| KeeperError::Decode(format!("invalid ciphertext hex: {e}")))?;

    let key = derive_key(passphrase)?;
    let cipher = cipher_for(&key)?;
    let nonce = Nonce::from_slice(&key[KEY_SIZE - NONCE_SIZE..]);

    let plaintext = cipher
        .decrypt(nonce, sealed.as_slice())
        .map_err(|_| KeeperError::Authentication("message authentication failed".to_string()))?;

    String::from_utf8(plaintext)
        .map_err(|e| KeeperError::Decode(format!("plaintext is not UTF-8: {e}")))
}
