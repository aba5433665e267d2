//! Agent wallet, scratchpad, and wallet-action types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::MessageRole;

const CHAINS: &[(u64, &str)] = &[
    (1, "mainnet"),
    (42161, "arbitrum"),
    (8453, "base"),
    (137, "polygon"),
    (10, "optimism"),
];

/// Chain name for a chain id. Unknown ids map to `base`.
pub fn chain_name(chain_id: u64) -> &'static str {
    CHAINS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, name)| *name)
        .unwrap_or("base")
}

/// A generated custodial wallet bound to one `(user wallet, chain)` pair.
///
/// The private key only ever exists here in encrypted form and is never
/// serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentWallet {
    pub agent_id: String,
    pub user_wallet_address: String,
    pub chain_id: u64,
    /// Public EVM address of the agent wallet.
    pub wallet_address: String,
    /// `nonce || ciphertext` produced by the vault.
    #[serde(skip)]
    pub encrypted_private_key: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Running transcript the upstream agent uses as context for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentScratchpad {
    pub session_id: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

/// One entry of the message history a client sends with a chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletActionType {
    Transaction,
    Approval,
    Swap,
}

/// A transaction the assistant proposes for the user's wallet to sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAction {
    #[serde(rename = "type")]
    pub action_type: WalletActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    /// Amount in wei, as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
    pub description: String,
}

/// Which generator produced a chat reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    RemoteAgent,
    LocalHeuristic,
}
