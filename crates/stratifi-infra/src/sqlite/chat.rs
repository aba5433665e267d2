//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `stratifi-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reader for SELECTs and
//! writer for everything else.

use sqlx::Row;
use stratifi_core::repository::chat::ChatRepository;
use stratifi_types::chat::{ChatMessage, ChatSession, MessageMetadata, MessageRole, SessionMetadata};
use stratifi_types::error::RepositoryError;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, placeholders, write_error};

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatSessionRow {
    id: String,
    user_id: String,
    session_name: Option<String>,
    metadata: String,
    context_key: Option<String>,
    created_at: String,
    last_message_at: String,
    is_active: i64,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            session_name: row.try_get("session_name")?,
            metadata: row.try_get("metadata")?,
            context_key: row.try_get("context_key")?,
            created_at: row.try_get("created_at")?,
            last_message_at: row.try_get("last_message_at")?,
            is_active: row.try_get("is_active")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;
        let metadata: SessionMetadata = serde_json::from_str(&self.metadata)
            .map_err(|e| RepositoryError::Query(format!("invalid session metadata: {e}")))?;

        Ok(ChatSession {
            id,
            user_id,
            session_name: self.session_name,
            metadata,
            context_key: self.context_key,
            created_at: parse_datetime(&self.created_at)?,
            last_message_at: parse_datetime(&self.last_message_at)?,
            is_active: self.is_active != 0,
        })
    }
}

struct ChatMessageRow {
    id: String,
    session_id: String,
    role: String,
    content: String,
    created_at: String,
    metadata: Option<String>,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
            metadata: row.try_get("metadata")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let session_id = Uuid::parse_str(&self.session_id)
            .map_err(|e| RepositoryError::Query(format!("invalid session_id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let metadata = self
            .metadata
            .as_deref()
            .map(serde_json::from_str::<MessageMetadata>)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid message metadata: {e}")))?;

        Ok(ChatMessage {
            id,
            session_id,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
            metadata,
        })
    }
}

fn rows_to_sessions(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<ChatSession>, RepositoryError> {
    let mut sessions = Vec::with_capacity(rows.len());
    for row in rows {
        let session_row =
            ChatSessionRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        sessions.push(session_row.into_session()?);
    }
    Ok(sessions)
}

fn row_to_session(row: Option<sqlx::sqlite::SqliteRow>) -> Result<Option<ChatSession>, RepositoryError> {
    match row {
        Some(row) => {
            let session_row =
                ChatSessionRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            Ok(Some(session_row.into_session()?))
        }
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        let metadata = serde_json::to_string(&session.metadata)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize metadata: {e}")))?;

        sqlx::query(
            r#"INSERT INTO chat_sessions (id, user_id, session_name, metadata, context_key, created_at, last_message_at, is_active)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(&session.session_name)
        .bind(metadata)
        .bind(&session.context_key)
        .bind(format_datetime(&session.created_at))
        .bind(format_datetime(&session.last_message_at))
        .bind(session.is_active as i64)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| write_error(e, "chat_sessions.context_key"))?;

        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        row_to_session(row)
    }

    async fn find_by_context_key(
        &self,
        user_id: &Uuid,
        context_key: &str,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        // Read from the writer so a just-committed winner is always visible.
        let row = sqlx::query(
            "SELECT * FROM chat_sessions WHERE user_id = ? AND context_key = ? AND is_active = 1",
        )
        .bind(user_id.to_string())
        .bind(context_key)
        .fetch_optional(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        row_to_session(row)
    }

    async fn list_active_sessions(&self, user_id: &Uuid) -> Result<Vec<ChatSession>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_sessions WHERE user_id = ? AND is_active = 1 ORDER BY last_message_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        rows_to_sessions(&rows)
    }

    async fn list_all_active_sessions(&self) -> Result<Vec<ChatSession>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM chat_sessions WHERE is_active = 1 ORDER BY created_at DESC")
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
        rows_to_sessions(&rows)
    }

    async fn deactivate_sessions(&self, session_ids: &[Uuid]) -> Result<u64, RepositoryError> {
        if session_ids.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "UPDATE chat_sessions SET is_active = 0 WHERE is_active = 1 AND id IN ({})",
            placeholders(session_ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in session_ids {
            query = query.bind(id.to_string());
        }
        let result = query
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn append_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        let metadata = message
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("failed to serialize metadata: {e}")))?;
        let created_at = format_datetime(&message.created_at);

        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Touch first: zero rows means the session is gone and nothing is written.
        let touched = sqlx::query(
            "UPDATE chat_sessions SET last_message_at = MAX(last_message_at, ?) WHERE id = ?",
        )
        .bind(&created_at)
        .bind(message.session_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if touched.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            r#"INSERT INTO chat_messages (id, session_id, role, content, created_at, metadata)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.session_id.to_string())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(&created_at)
        .bind(metadata)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }

    async fn get_messages(&self, session_id: &Uuid) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_messages WHERE session_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row =
                ChatMessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }
        Ok(messages)
    }

    async fn delete_messages(&self, session_ids: &[Uuid]) -> Result<u64, RepositoryError> {
        if session_ids.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "DELETE FROM chat_messages WHERE session_id IN ({})",
            placeholders(session_ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in session_ids {
            query = query.bind(id.to_string());
        }
        let result = query
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn count_active_sessions(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_sessions WHERE is_active = 1")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(count as u64)
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_messages")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(count as u64)
    }
}
