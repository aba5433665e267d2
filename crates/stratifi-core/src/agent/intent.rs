//! Wallet-action extraction from agent reply text.
//!
//! This is substring matching, not a parser: a reply mentioning both USDC
//! and lending yields a fixed Morpho lend transaction.

use stratifi_types::agent::{WalletAction, WalletActionType};

/// Morpho protocol contract the lend transaction targets.
pub const MORPHO_ADDRESS: &str = "0x8Df14A537FE45a23B0D4b9cECED1a9b6DDB1C86F";

/// USDC token contract.
pub const USDC_ADDRESS: &str = "0xA0b86a33E6441a1E7B17c98d3f1A5eF9E2D0b00e";

/// 100 tokens at 18 decimals, in wei.
pub const LEND_AMOUNT_WEI: &str = "100000000000000000000";

/// Pool id recorded for activities created from an extracted action.
pub const MORPHO_USDC_POOL: &str = "morpho-usdc";

/// Propose a wallet action if `text` mentions both `usdc` and `lend`
/// (case-insensitive).
pub fn extract_wallet_action(text: &str) -> Option<WalletAction> {
    let lower = text.to_lowercase();
    if !(lower.contains("usdc") && lower.contains("lend")) {
        return None;
    }

    Some(WalletAction {
        action_type: WalletActionType::Transaction,
        to_address: Some(MORPHO_ADDRESS.to_string()),
        value: Some(LEND_AMOUNT_WEI.to_string()),
        data: None,
        token_address: Some(USDC_ADDRESS.to_string()),
        description: "Approve and lend USDC to Morpho protocol".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usdc_and_lend_yields_transaction() {
        let action = extract_wallet_action("You could LEND your Usdc on Morpho.").unwrap();
        assert_eq!(action.action_type, WalletActionType::Transaction);
        assert_eq!(action.to_address.as_deref(), Some(MORPHO_ADDRESS));
        assert_eq!(action.token_address.as_deref(), Some(USDC_ADDRESS));
        assert_eq!(action.value.as_deref(), Some(LEND_AMOUNT_WEI));
    }

    #[test]
    fn test_needs_both_words() {
        assert!(extract_wallet_action("lend some ETH").is_none());
        assert!(extract_wallet_action("USDC is a stablecoin").is_none());
        assert!(extract_wallet_action("").is_none());
    }

    #[test]
    fn test_lending_counts_as_lend() {
        assert!(extract_wallet_action("USDC lending rates are up").is_some());
    }
}
