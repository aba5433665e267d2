//! Assistant greeting posted into a freshly created context session.

use stratifi_types::chat::SessionContext;

/// Build the "asset details" greeting for a session launched from `context`.
///
/// The text differs for borrowing vs. lending, and for whether a wallet is
/// connected (`wallet` is `Some`).
pub fn asset_details_message(context: &SessionContext, wallet: Option<&str>) -> String {
    let borrow = context.is_borrow();
    let token = context.token.to_uppercase();
    let (action_text, action_title, emoji) = if borrow {
        ("borrowing", "Borrowing", "📤")
    } else {
        ("lending", "Lending", "📥")
    };

    let capabilities = if borrow {
        format!(
            "💰 **Borrowing {token}:**\n\
             • Check your collateral requirements\n\
             • Calculate borrowing capacity\n\
             • Show current interest rates\n\
             • Execute the borrowing transaction\n\
             • Monitor your health factor"
        )
    } else {
        format!(
            "💎 **Lending {token}:**\n\
             • Calculate potential APY earnings\n\
             • Show lending pool utilization\n\
             • Execute the lending transaction\n\
             • Track your lending rewards\n\
             • Monitor pool performance"
        )
    };

    let next_steps = match wallet {
        None => format!(
            "⚠️ **Next Steps:**\n\
             1. Connect your wallet to proceed\n\
             2. I'll verify your {}\n\
             3. Prepare the transaction\n\
             4. Execute {action_text}\n\n\
             Would you like me to help you connect your wallet to get started?",
            if borrow { "collateral" } else { "balance" }
        ),
        Some(address) => format!(
            "✅ **Wallet Connected!**\n\
             Your wallet ({}) is ready.\n\n\
             Would you like me to:\n\
             • Check your {}\n\
             • Show you the {action_text} terms for this pool\n\
             • Prepare the transaction for {action_text} {token}?",
            short_address(address),
            if borrow {
                "collateral and borrowing capacity"
            } else {
                "current balance"
            }
        ),
    };

    format!(
        "{emoji} **Asset Details from Landing Page**\n\n\
         **Token:** {token}\n\
         **Pool ID:** {pool}\n\
         **Action:** {action_title}\n\n\
         I can help you proceed with {action_text} {token}. Here's what I can do:\n\n\
         {capabilities}\n\n\
         {next_steps}",
        pool = context.pool_id,
    )
}

/// `0x1234...abcd` style abbreviation. Short inputs are returned unchanged.
fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lend_greeting_without_wallet() {
        let ctx = SessionContext::new("usdc", "pool-7", "lend");
        let text = asset_details_message(&ctx, None);

        assert!(text.starts_with("📥 **Asset Details from Landing Page**"));
        assert!(text.contains("**Token:** USDC"));
        assert!(text.contains("**Pool ID:** pool-7"));
        assert!(text.contains("**Action:** Lending"));
        assert!(text.contains("2. I'll verify your balance"));
        assert!(text.contains("connect your wallet"));
    }

    #[test]
    fn test_borrow_greeting_with_wallet() {
        let ctx = SessionContext::new("eth", "3", "borrow");
        let text = asset_details_message(&ctx, Some("0x1234567890abcdef1234"));

        assert!(text.starts_with("📤"));
        assert!(text.contains("💰 **Borrowing ETH:**"));
        assert!(text.contains("Your wallet (0x1234...1234) is ready."));
        assert!(text.contains("collateral and borrowing capacity"));
    }

    #[test]
    fn test_short_address_leaves_short_input() {
        assert_eq!(short_address("0xabc"), "0xabc");
    }
}
