//! Chat session and message types for Stratifi.
//!
//! These types model assistant conversations: sessions owned by a user,
//! optionally launched from an asset context, and the append-only messages
//! within them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Author of a chat message.
///
/// Serialized as `user` / `ai`. `assistant` is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai", alias = "assistant")]
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "ai"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "ai" | "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// The `{token, poolId, action}` tuple a chat was launched from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub token: String,
    pub pool_id: String,
    pub action: String,
}

impl SessionContext {
    pub fn new(
        token: impl Into<String>,
        pool_id: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            pool_id: pool_id.into(),
            action: action.into(),
        }
    }

    /// Human-readable session name, e.g. `LEND USDC`.
    pub fn session_name(&self) -> String {
        format!("{} {}", self.action.to_uppercase(), self.token)
    }

    /// Key identifying this context for a given user: `userId-token-poolId-action`.
    pub fn handled_key(&self, user_id: &Uuid) -> String {
        format!("{user_id}-{}-{}-{}", self.token, self.pool_id, self.action)
    }

    /// Whether the chat concerns borrowing (anything else is treated as lending).
    pub fn is_borrow(&self) -> bool {
        self.action.eq_ignore_ascii_case("borrow")
    }
}

/// Free-form session metadata, stored as a JSON column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_context: Option<SessionContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_messages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active_chain: Option<String>,
}

/// A persisted conversation thread owned by one user.
///
/// Sessions are never hard-deleted in normal operation; they transition
/// once from active to inactive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_name: Option<String>,
    #[serde(default)]
    pub metadata: SessionMetadata,
    /// Store-level idempotency key for context sessions (hash of user + tuple).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
    pub is_active: bool,
}

impl ChatSession {
    /// True if this session was launched from exactly `context`.
    pub fn matches_context(&self, context: &SessionContext) -> bool {
        self.metadata.initial_context.as_ref() == Some(context)
    }
}

/// Per-message metadata, stored as a JSON column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains_transaction: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// A single message within a chat session.
///
/// Messages are ordered by `created_at` within a session and never edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_wire_names() {
        assert_eq!(serde_json::to_string(&MessageRole::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&MessageRole::Assistant).unwrap(), "\"ai\"");

        let parsed: MessageRole = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(parsed, MessageRole::Assistant);
    }

    #[test]
    fn test_message_role_from_str() {
        assert_eq!("AI".parse::<MessageRole>().unwrap(), MessageRole::Assistant);
        assert_eq!("user".parse::<MessageRole>().unwrap(), MessageRole::User);
        assert!("system".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_context_session_name() {
        let ctx = SessionContext::new("USDC", "pool-1", "lend");
        assert_eq!(ctx.session_name(), "LEND USDC");
    }

    #[test]
    fn test_context_handled_key() {
        let user_id = Uuid::nil();
        let ctx = SessionContext::new("eth", "7", "borrow");
        assert_eq!(
            ctx.handled_key(&user_id),
            "00000000-0000-0000-0000-000000000000-eth-7-borrow"
        );
        assert!(ctx.is_borrow());
    }

    #[test]
    fn test_metadata_uses_initial_context_key() {
        let meta = SessionMetadata {
            initial_context: Some(SessionContext::new("btc", "3", "lend")),
            ..Default::default()
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["initialContext"]["poolId"], "3");
        assert!(json.get("totalMessages").is_none());
    }

    #[test]
    fn test_matches_context_requires_all_fields() {
        let session = ChatSession {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            session_name: None,
            metadata: SessionMetadata {
                initial_context: Some(SessionContext::new("btc", "3", "lend")),
                ..Default::default()
            },
            context_key: None,
            created_at: Utc::now(),
            last_message_at: Utc::now(),
            is_active: true,
        };
        assert!(session.matches_context(&SessionContext::new("btc", "3", "lend")));
        assert!(!session.matches_context(&SessionContext::new("btc", "3", "borrow")));
        assert!(!session.matches_context(&SessionContext::new("btc", "4", "lend")));
    }
}
