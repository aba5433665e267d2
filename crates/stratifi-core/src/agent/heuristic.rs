//! Local heuristic replies used when the remote agent is unavailable.

/// Deterministic fallback reply for `message` on `chain` (a chain name).
///
/// Keyed on substrings of the lower-cased message: `lend`/`supply`,
/// `borrow`, `yield`/`farm`, anything else gets the generic overview.
pub fn fallback_response(message: &str, chain: &str) -> String {
    let lower = message.to_lowercase();

    let topic = if lower.contains("lend") || lower.contains("supply") {
        "\n• **Lending USDC**: ~4-8% APY on Aave, Compound\n\
         • **ETH Lending**: ~2-5% APY with lower risk\n\
         • **Stablecoin Pools**: Curve, Balancer for stable yields\n\n\
         💡 **Recommendation**: Start with blue-chip protocols like Aave for safer lending."
    } else if lower.contains("borrow") {
        "\n• **Collateralized Borrowing**: Use ETH as collateral\n\
         • **Health Factor**: Keep above 1.5 for safety\n\
         • **Interest Rates**: Variable rates 2-12% depending on asset\n\n\
         ⚠️ **Risk Warning**: Monitor your collateral ratio closely."
    } else if lower.contains("yield") || lower.contains("farm") {
        "\n• **LP Tokens**: Uniswap V3, Curve pools\n\
         • **Yield Farming**: Convex, Yearn strategies\n\
         • **Staking**: ETH 2.0, protocol governance tokens\n\n\
         📊 **Current Yields**: 5-15% for moderate risk strategies."
    } else {
        "\n• **Lending**: Supply assets to earn yield (4-8% APY)\n\
         • **Borrowing**: Use collateral to borrow other assets\n\
         • **LP Provision**: Provide liquidity for trading fees\n\
         • **Yield Farming**: Stake LP tokens for additional rewards\n\n\
         🚀 **Getting Started**: Connect your wallet and I can help execute transactions."
    };

    format!(
        "I understand you're asking about \"{message}\". While my advanced analysis engine is \
         temporarily unavailable, I can still help you with DeFi strategies on {chain}.\n\n\
         🔹 **Popular DeFi Actions on {title}:**{topic}\n\n\
         *Backend connection will be restored shortly for advanced market analysis and \
         automated strategies.*\n\n\
         What would you like to explore?",
        title = capitalize(chain),
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
