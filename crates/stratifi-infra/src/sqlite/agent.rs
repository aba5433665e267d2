//! SQLite agent repository: agent wallets, scratchpads, and user activities.

use sqlx::Row;
use stratifi_core::repository::agent::AgentRepository;
use stratifi_types::activity::{ActivityStatus, ActivityType, UserActivity};
use stratifi_types::agent::{AgentScratchpad, AgentWallet};
use stratifi_types::error::RepositoryError;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, write_error};

/// SQLite-backed implementation of `AgentRepository`.
pub struct SqliteAgentRepository {
    pool: DatabasePool,
}

impl SqliteAgentRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types
// ---------------------------------------------------------------------------

struct AgentWalletRow {
    agent_id: String,
    user_wallet_address: String,
    chain_id: i64,
    wallet_address: String,
    encrypted_private_key: Vec<u8>,
    created_at: String,
}

impl AgentWalletRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            agent_id: row.try_get("agent_id")?,
            user_wallet_address: row.try_get("user_wallet_address")?,
            chain_id: row.try_get("chain_id")?,
            wallet_address: row.try_get("wallet_address")?,
            encrypted_private_key: row.try_get("encrypted_private_key")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_agent(self) -> Result<AgentWallet, RepositoryError> {
        Ok(AgentWallet {
            agent_id: self.agent_id,
            user_wallet_address: self.user_wallet_address,
            chain_id: self.chain_id as u64,
            wallet_address: self.wallet_address,
            encrypted_private_key: self.encrypted_private_key,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

struct ActivityRow {
    id: String,
    user_wallet_address: String,
    session_id: Option<String>,
    activity_type: String,
    token_symbol: String,
    pool_id: String,
    amount: Option<String>,
    transaction_hash: Option<String>,
    status: String,
    created_at: String,
    metadata: String,
}

impl ActivityRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_wallet_address: row.try_get("user_wallet_address")?,
            session_id: row.try_get("session_id")?,
            activity_type: row.try_get("activity_type")?,
            token_symbol: row.try_get("token_symbol")?,
            pool_id: row.try_get("pool_id")?,
            amount: row.try_get("amount")?,
            transaction_hash: row.try_get("transaction_hash")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            metadata: row.try_get("metadata")?,
        })
    }

    fn into_activity(self) -> Result<UserActivity, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid activity id: {e}")))?;
        let activity_type: ActivityType = self
            .activity_type
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let status: ActivityStatus = self
            .status
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let metadata = serde_json::from_str(&self.metadata)
            .map_err(|e| RepositoryError::Query(format!("invalid activity metadata: {e}")))?;

        Ok(UserActivity {
            id,
            user_wallet_address: self.user_wallet_address,
            session_id: self.session_id,
            activity_type,
            token_symbol: self.token_symbol,
            pool_id: self.pool_id,
            amount: self.amount,
            transaction_hash: self.transaction_hash,
            status,
            created_at: parse_datetime(&self.created_at)?,
            metadata,
        })
    }
}

fn row_to_agent(row: Option<sqlx::sqlite::SqliteRow>) -> Result<Option<AgentWallet>, RepositoryError> {
    match row {
        Some(row) => {
            let agent_row =
                AgentWalletRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            Ok(Some(agent_row.into_agent()?))
        }
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// AgentRepository implementation
// ---------------------------------------------------------------------------

impl AgentRepository for SqliteAgentRepository {
    async fn find_agent(
        &self,
        user_wallet_address: &str,
        chain_id: u64,
    ) -> Result<Option<AgentWallet>, RepositoryError> {
        let row = sqlx::query(
            "SELECT * FROM agent_wallets WHERE user_wallet_address = ? AND chain_id = ?",
        )
        .bind(user_wallet_address)
        .bind(chain_id as i64)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        row_to_agent(row)
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Option<AgentWallet>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM agent_wallets WHERE agent_id = ?")
            .bind(agent_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        row_to_agent(row)
    }

    async fn insert_agent(&self, agent: &AgentWallet) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO agent_wallets (agent_id, user_wallet_address, chain_id, wallet_address, encrypted_private_key, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&agent.agent_id)
        .bind(&agent.user_wallet_address)
        .bind(agent.chain_id as i64)
        .bind(&agent.wallet_address)
        .bind(&agent.encrypted_private_key)
        .bind(format_datetime(&agent.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| write_error(e, "agent_wallets"))?;
        Ok(())
    }

    async fn count_agents(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM agent_wallets")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(count as u64)
    }

    async fn get_scratchpad(&self, session_id: &str) -> Result<Option<AgentScratchpad>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM agent_scratchpads WHERE session_id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let content: String = row
                    .try_get("content")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let updated_at: String = row
                    .try_get("updated_at")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(AgentScratchpad {
                    session_id: session_id.to_string(),
                    content,
                    updated_at: parse_datetime(&updated_at)?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn upsert_scratchpad(&self, scratchpad: &AgentScratchpad) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO agent_scratchpads (session_id, content, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT(session_id) DO UPDATE SET content = excluded.content, updated_at = excluded.updated_at"#,
        )
        .bind(&scratchpad.session_id)
        .bind(&scratchpad.content)
        .bind(format_datetime(&scratchpad.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }

    async fn record_activity(&self, activity: &UserActivity) -> Result<(), RepositoryError> {
        let metadata = serde_json::to_string(&activity.metadata)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize metadata: {e}")))?;

        sqlx::query(
            r#"INSERT INTO user_activities (id, user_wallet_address, session_id, activity_type, token_symbol, pool_id, amount, transaction_hash, status, created_at, metadata)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(activity.id.to_string())
        .bind(&activity.user_wallet_address)
        .bind(&activity.session_id)
        .bind(activity.activity_type.to_string())
        .bind(&activity.token_symbol)
        .bind(&activity.pool_id)
        .bind(&activity.amount)
        .bind(&activity.transaction_hash)
        .bind(activity.status.to_string())
        .bind(format_datetime(&activity.created_at))
        .bind(metadata)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }

    async fn list_activities(&self, user_wallet_address: &str) -> Result<Vec<UserActivity>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM user_activities WHERE user_wallet_address = ? ORDER BY created_at DESC",
        )
        .bind(user_wallet_address)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut activities = Vec::with_capacity(rows.len());
        for row in &rows {
            let activity_row =
                ActivityRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            activities.push(activity_row.into_activity()?);
        }
        Ok(activities)
    }
}
