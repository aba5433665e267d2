//! User activity records (lending, borrowing, and related wallet actions).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Borrow,
    Lend,
    Repay,
    Withdraw,
    Liquidation,
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityType::Borrow => "borrow",
            ActivityType::Lend => "lend",
            ActivityType::Repay => "repay",
            ActivityType::Withdraw => "withdraw",
            ActivityType::Liquidation => "liquidation",
        };
        f.write_str(s)
    }
}

impl FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrow" => Ok(ActivityType::Borrow),
            "lend" => Ok(ActivityType::Lend),
            "repay" => Ok(ActivityType::Repay),
            "withdraw" => Ok(ActivityType::Withdraw),
            "liquidation" => Ok(ActivityType::Liquidation),
            other => Err(format!("invalid activity type: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    #[default]
    Pending,
    Confirmed,
    Failed,
    Cancelled,
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityStatus::Pending => "pending",
            ActivityStatus::Confirmed => "confirmed",
            ActivityStatus::Failed => "failed",
            ActivityStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl FromStr for ActivityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ActivityStatus::Pending),
            "confirmed" => Ok(ActivityStatus::Confirmed),
            "failed" => Ok(ActivityStatus::Failed),
            "cancelled" => Ok(ActivityStatus::Cancelled),
            other => Err(format!("invalid activity status: '{other}'")),
        }
    }
}

/// A wallet activity a user started (or the assistant proposed) in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserActivity {
    pub id: Uuid,
    pub user_wallet_address: String,
    pub session_id: Option<String>,
    pub activity_type: ActivityType,
    pub token_symbol: String,
    pub pool_id: String,
    pub amount: Option<String>,
    pub transaction_hash: Option<String>,
    pub status: ActivityStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_type_roundtrip() {
        for t in [
            ActivityType::Borrow,
            ActivityType::Lend,
            ActivityType::Repay,
            ActivityType::Withdraw,
            ActivityType::Liquidation,
        ] {
            assert_eq!(t.to_string().parse::<ActivityType>().unwrap(), t);
        }
    }

    #[test]
    fn test_activity_status_default_pending() {
        assert_eq!(ActivityStatus::default(), ActivityStatus::Pending);
        assert!("settled".parse::<ActivityStatus>().is_err());
    }
}
