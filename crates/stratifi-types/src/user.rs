//! User identity types.
//!
//! A user is keyed by a normalized (lower-cased) wallet address. The address
//! is the only identity the dashboard knows about.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default risk profile reported to the upstream agent when none is stored.
pub const DEFAULT_RISK_PROFILE: &str = "moderate";

/// A durable user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Always lower-cased. Unique across all users.
    pub wallet_address: String,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    #[serde(default)]
    pub preferences: UserPreferences,
}

/// Free-form user preferences, stored as a JSON column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_slippage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_chain: Option<String>,
    /// Chain the user first created an agent on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_profile: Option<String>,
}

impl UserPreferences {
    /// The stored risk profile, or `moderate`.
    pub fn risk_profile_or_default(&self) -> &str {
        self.risk_profile.as_deref().unwrap_or(DEFAULT_RISK_PROFILE)
    }
}

/// Normalize a wallet address for storage and lookup.
///
/// Trims surrounding whitespace and lower-cases. Returns `None` for blank input.
pub fn normalize_wallet_address(address: &str) -> Option<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}
