//! AES-256-GCM vault encryption for agent private keys at rest.
//!
//! The 32-byte master key comes from `STRATIFI_VAULT_KEY` (64 hex chars) or
//! from `{data_dir}/vault.key`, which is generated on first use.
//!
//! Encrypted format: `nonce (12 bytes) || ciphertext`
//!
//! SECURITY: Error types never contain plaintext or key material.

use std::path::Path;

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use secrecy::{ExposeSecret, SecretString};
use stratifi_core::agent::keys::KeyCipher;
use stratifi_types::error::AgentError;
use thiserror::Error;

/// Nonce size for AES-256-GCM (96 bits / 12 bytes).
const NONCE_SIZE: usize = 12;

/// File name of the generated master key inside the data directory.
pub const VAULT_KEY_FILE: &str = "vault.key";

/// Errors from vault operations.
///
/// IMPORTANT: These never include plaintext, key material, or ciphertext.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("encryption failed")]
    EncryptionFailed,

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("invalid ciphertext: too short")]
    CiphertextTooShort,

    #[error("invalid vault key: expected 64 hex characters")]
    InvalidKey,

    #[error("vault key file error: {0}")]
    KeyFile(String),
}

/// AES-256-GCM encryption for secrets at rest.
///
/// Each encryption call generates a random 12-byte nonce, prepended to the
/// ciphertext, so encrypting the same plaintext twice gives different output.
pub struct VaultCrypto {
    cipher: Aes256Gcm,
}

impl VaultCrypto {
    /// Create a new VaultCrypto from a raw 32-byte key.
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.into()),
        }
    }

    /// Create from a hex-encoded 32-byte key.
    pub fn from_hex(hex_key: &SecretString) -> Result<Self, VaultError> {
        let bytes = hex::decode(hex_key.expose_secret().trim()).map_err(|_| VaultError::InvalidKey)?;
        let key: [u8; 32] = bytes.try_into().map_err(|_| VaultError::InvalidKey)?;
        Ok(Self::new(&key))
    }

    /// Load the key stored at `path`, or generate one and write it there.
    ///
    /// New key files are created with mode 0600 on Unix. The key is written
    /// to a temporary file and linked into place, so a process that loses a
    /// startup race reads the winner's complete key.
    pub fn from_key_file(path: &Path) -> Result<Self, VaultError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_hex(&SecretString::from(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| VaultError::KeyFile(e.to_string()))?;
                }
                let key = rand_bytes();
                match publish_key_file(path, &hex::encode(key)) {
                    Ok(()) => {
                        tracing::info!(path = %path.display(), "Generated new vault key");
                        Ok(Self::new(&key))
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                        tracing::debug!(
                            path = %path.display(),
                            "Vault key created concurrently, reusing it"
                        );
                        let contents = std::fs::read_to_string(path)
                            .map_err(|e| VaultError::KeyFile(e.to_string()))?;
                        Self::from_hex(&SecretString::from(contents))
                    }
                    Err(e) => Err(VaultError::KeyFile(e.to_string())),
                }
            }
            Err(e) => Err(VaultError::KeyFile(e.to_string())),
        }
    }

    /// Resolve the vault: an explicit key wins, otherwise the data-dir key file.
    pub fn load(env_key: Option<&SecretString>, data_dir: &Path) -> Result<Self, VaultError> {
        match env_key {
            Some(key) => Self::from_hex(key),
            None => Self::from_key_file(&data_dir.join(VAULT_KEY_FILE)),
        }
    }

    /// Encrypt plaintext. Returns `nonce (12 bytes) || ciphertext`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, VaultError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| VaultError::EncryptionFailed)?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce);
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    /// Decrypt data produced by `encrypt()`.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, VaultError> {
        if data.len() < NONCE_SIZE {
            return Err(VaultError::CiphertextTooShort);
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| VaultError::DecryptionFailed)
    }
}

impl KeyCipher for VaultCrypto {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, AgentError> {
        self.encrypt(plaintext).map_err(|_| AgentError::Encryption)
    }

    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, AgentError> {
        self.decrypt(sealed).map_err(|_| AgentError::Encryption)
    }
}

/// Generate 32 random bytes using the OS CSPRNG.
fn rand_bytes() -> [u8; 32] {
    use rand::RngCore;
    let mut key = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut key);
    key
}

/// Write `hex_key` to a sibling temp file, then hard-link it to `path`.
///
/// Fails with `AlreadyExists` when another writer published first.
fn publish_key_file(path: &Path, hex_key: &str) -> std::io::Result<()> {
    let suffix: [u8; 8] = rand::random();
    let tmp = path.with_extension(format!("tmp-{}", hex::encode(suffix)));

    write_private_file(&tmp, hex_key)?;
    let linked = std::fs::hard_link(&tmp, path);
    let _ = std::fs::remove_file(&tmp);
    linked
}

#[cfg(unix)]
fn write_private_file(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, contents: &str) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let crypto = VaultCrypto::new(&test_key());
        let plaintext = b"4c0883a69102937d6231471b5dbb6204fe512961708279f2e3e8a5d4b8e3e6a1";

        let encrypted = crypto.encrypt(plaintext).unwrap();
        assert_ne!(&encrypted[NONCE_SIZE..], plaintext.as_slice());
        assert_eq!(crypto.decrypt(&encrypted).unwrap(), plaintext);
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let crypto1 = VaultCrypto::new(&test_key());
        let mut wrong_key = test_key();
        wrong_key[0] = 0xFF;
        let crypto2 = VaultCrypto::new(&wrong_key);

        let encrypted = crypto1.encrypt(b"secret data").unwrap();
        assert!(matches!(
            crypto2.decrypt(&encrypted).unwrap_err(),
            VaultError::DecryptionFailed
        ));
    }

    #[test]
    fn test_random_nonce_produces_different_ciphertexts() {
        let crypto = VaultCrypto::new(&test_key());
        let encrypted1 = crypto.encrypt(b"same").unwrap();
        let encrypted2 = crypto.encrypt(b"same").unwrap();
        assert_ne!(encrypted1, encrypted2);
    }

    #[test]
    fn test_ciphertext_too_short() {
        let crypto = VaultCrypto::new(&test_key());
        assert!(matches!(
            crypto.decrypt(&[0u8; 5]).unwrap_err(),
            VaultError::CiphertextTooShort
        ));
    }

    #[test]
    fn test_from_hex_validates_length() {
        let good = SecretString::from(hex::encode(test_key()));
        assert!(VaultCrypto::from_hex(&good).is_ok());

        let short = SecretString::from("abcd".to_string());
        assert!(matches!(
            VaultCrypto::from_hex(&short),
            Err(VaultError::InvalidKey)
        ));
        let junk = SecretString::from("zz".repeat(32));
        assert!(VaultCrypto::from_hex(&junk).is_err());
    }

    #[test]
    fn test_key_file_created_then_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(VAULT_KEY_FILE);

        let first = VaultCrypto::from_key_file(&path).unwrap();
        assert!(path.exists());
        let sealed = first.encrypt(b"agent key").unwrap();

        let second = VaultCrypto::from_key_file(&path).unwrap();
        assert_eq!(second.decrypt(&sealed).unwrap(), b"agent key");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_concurrent_first_start_agrees_on_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(VAULT_KEY_FILE);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || VaultCrypto::from_key_file(&path))
            })
            .collect();
        let vaults: Vec<VaultCrypto> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();

        let sealed = vaults[0].encrypt(b"shared").unwrap();
        for vault in &vaults {
            assert_eq!(vault.decrypt(&sealed).unwrap(), b"shared");
        }

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temporary key files are cleaned up");
    }

    #[test]
    fn test_existing_key_file_wins_over_new_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(VAULT_KEY_FILE);
        std::fs::write(&path, hex::encode(test_key())).unwrap();

        let err = publish_key_file(&path, &hex::encode([1u8; 32])).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);

        let vault = VaultCrypto::from_key_file(&path).unwrap();
        let sealed = VaultCrypto::new(&test_key()).encrypt(b"k").unwrap();
        assert_eq!(vault.decrypt(&sealed).unwrap(), b"k");
    }

    #[test]
    fn test_load_prefers_explicit_key() {
        let dir = tempfile::tempdir().unwrap();
        let key = SecretString::from(hex::encode(test_key()));

        let vault = VaultCrypto::load(Some(&key), dir.path()).unwrap();
        assert!(!dir.path().join(VAULT_KEY_FILE).exists());

        let sealed = vault.encrypt(b"x").unwrap();
        assert_eq!(VaultCrypto::new(&test_key()).decrypt(&sealed).unwrap(), b"x");
    }

    #[test]
    fn test_vault_error_never_contains_secrets() {
        let errors = [
            VaultError::EncryptionFailed,
            VaultError::DecryptionFailed,
            VaultError::CiphertextTooShort,
            VaultError::InvalidKey,
        ];
        for err in &errors {
            assert!(!err.to_string().contains("deadbeef"));
        }
    }
}
