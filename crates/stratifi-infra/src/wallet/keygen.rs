//! secp256k1 keypair generation via ethers.
//!
//! Private keys leave this module only as hex inside `GeneratedKey`, whose
//! Debug output is redacted; callers seal them with the vault before storage.

use ethers::signers::{LocalWallet, Signer};
use rand::RngCore;
use stratifi_core::agent::keys::{AgentKeyGenerator, GeneratedKey};
use stratifi_types::error::AgentError;

/// Generates fresh agent wallets with the thread-local CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct EthersKeyGenerator;

impl EthersKeyGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl AgentKeyGenerator for EthersKeyGenerator {
    fn generate(&self) -> Result<GeneratedKey, AgentError> {
        let wallet = LocalWallet::new(&mut ethers::core::rand::thread_rng());
        let private_key_hex = hex::encode(wallet.signer().to_bytes());
        if private_key_hex.len() != 64 {
            return Err(AgentError::KeyGeneration(
                "unexpected private key length".to_string(),
            ));
        }

        Ok(GeneratedKey {
            address: ethers::utils::to_checksum(&wallet.address(), None),
            private_key_hex,
        })
    }

    fn new_agent_id(&self) -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}
