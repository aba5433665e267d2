//! Ports for agent wallet key material.
//!
//! Key generation (ethers) and at-rest encryption (AES-256-GCM vault) are
//! implemented in stratifi-infra.

use std::fmt;

use stratifi_types::error::AgentError;

/// A freshly generated EVM keypair.
pub struct GeneratedKey {
    /// Checksummed `0x` address.
    pub address: String,
    /// Hex-encoded secp256k1 private key, without `0x`.
    pub private_key_hex: String,
}

impl fmt::Debug for GeneratedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedKey")
            .field("address", &self.address)
            .field("private_key_hex", &"[REDACTED]")
            .finish()
    }
}

/// Generates agent wallets and agent ids.
pub trait AgentKeyGenerator: Send + Sync {
    fn generate(&self) -> Result<GeneratedKey, AgentError>;

    /// A new unique agent id (32 lowercase hex chars).
    fn new_agent_id(&self) -> String;
}

/// Encrypts private keys before they reach the store.
pub trait KeyCipher: Send + Sync {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, AgentError>;

    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, AgentError>;
}
