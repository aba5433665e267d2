//! Text assembly for agent turns: the contextual prompt sent upstream and
//! the scratchpad transcript.

use chrono::{DateTime, SecondsFormat, Utc};
use stratifi_types::agent::{chain_name, HistoryEntry};

/// How many trailing history entries are included in the prompt.
pub const HISTORY_WINDOW: usize = 5;

/// Everything the contextual prompt is built from.
pub struct PromptContext<'a> {
    pub user_wallet: &'a str,
    pub chain_id: u64,
    pub agent_wallet: &'a str,
    pub risk_profile: &'a str,
    pub scratchpad: Option<&'a str>,
    pub history: &'a [HistoryEntry],
    pub message: &'a str,
}

/// Build the message forwarded to the remote agent.
pub fn contextual_message(ctx: &PromptContext<'_>) -> String {
    let start = ctx.history.len().saturating_sub(HISTORY_WINDOW);
    let history = ctx.history[start..]
        .iter()
        .map(|entry| format!("{}: {}", entry.role, entry.content))
        .collect::<Vec<_>>()
        .join("\n");

    let previous = ctx
        .scratchpad
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("None");

    format!(
        "User Wallet: {}\n\
         Chain: {} ({})\n\
         Agent Wallet: {}\n\
         Risk Profile: {}\n\
         Previous Context: {previous}\n\n\
         Message History:\n\
         {history}\n\n\
         Current Message: {}",
        ctx.user_wallet,
        chain_name(ctx.chain_id),
        ctx.chain_id,
        ctx.agent_wallet,
        ctx.risk_profile,
        ctx.message,
    )
    .trim()
    .to_string()
}

/// Append one exchange to the scratchpad transcript.
pub fn append_scratchpad(
    existing: Option<&str>,
    message: &str,
    response: &str,
    at: DateTime<Utc>,
) -> String {
    let entry = format!(
        "User: {message}\nAgent: {response}\nTimestamp: {}\n---",
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    );
    match existing.map(str::trim).filter(|s| !s.is_empty()) {
        Some(prev) => format!("{prev}\n{entry}"),
        None => entry,
    }
}

#[cfg(test)]
mod tests {
    use stratifi_types::chat::MessageRole;

    use super::*;

    fn entry(role: MessageRole, content: &str) -> HistoryEntry {
        HistoryEntry {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_contextual_message_fields() {
        let history = vec![
            entry(MessageRole::User, "hi"),
            entry(MessageRole::Assistant, "hello"),
        ];
        let text = contextual_message(&PromptContext {
            user_wallet: "0xuser",
            chain_id: 42161,
            agent_wallet: "0xAgent",
            risk_profile: "moderate",
            scratchpad: None,
            history: &history,
            message: "what now?",
        });

        assert!(text.starts_with("User Wallet: 0xuser"));
        assert!(text.contains("Chain: arbitrum (42161)"));
        assert!(text.contains("Agent Wallet: 0xAgent"));
        assert!(text.contains("Risk Profile: moderate"));
        assert!(text.contains("Previous Context: None"));
        assert!(text.contains("user: hi\nai: hello"));
        assert!(text.ends_with("Current Message: what now?"));
    }

    #[test]
    fn test_contextual_message_keeps_last_five_entries() {
        let history: Vec<HistoryEntry> = (0..8)
            .map(|i| entry(MessageRole::User, &format!("m{i}")))
            .collect();
        let text = contextual_message(&PromptContext {
            user_wallet: "0xuser",
            chain_id: 8453,
            agent_wallet: "0xagent",
            risk_profile: "moderate",
            scratchpad: Some("earlier"),
            history: &history,
            message: "next",
        });

        assert!(!text.contains("user: m2"));
        assert!(text.contains("user: m3"));
        assert!(text.contains("user: m7"));
        assert!(text.contains("Previous Context: earlier"));
    }

    #[test]
    fn test_scratchpad_appends_entries() {
        let at = Utc::now();
        let first = append_scratchpad(None, "hi", "hello", at);
        assert!(first.starts_with("User: hi\nAgent: hello\nTimestamp: "));
        assert!(first.ends_with("---"));

        let second = append_scratchpad(Some(&first), "more", "sure", at);
        assert!(second.starts_with(&first));
        assert!(second.len() > first.len());
        assert_eq!(second.matches("---").count(), 2);
    }
}
