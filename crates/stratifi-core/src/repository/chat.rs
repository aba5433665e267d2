//! ChatRepository trait definition.
//!
//! Provides session and message persistence. Sessions are soft-deleted by
//! flipping `is_active`; messages are append-only.

use stratifi_types::chat::{ChatMessage, ChatSession};
use stratifi_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for chat session and message persistence.
///
/// Implementations live in stratifi-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    /// Create a new chat session.
    ///
    /// Returns `Conflict` if the user already has an active session with the
    /// same `context_key`.
    fn create_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Get a chat session by its unique ID (active or not).
    fn get_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// Find the user's active session carrying `context_key`.
    fn find_by_context_key(
        &self,
        user_id: &Uuid,
        context_key: &str,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// Active sessions for a user, ordered by last_message_at DESC.
    fn list_active_sessions(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;

    /// Active sessions across all users, ordered by created_at DESC.
    fn list_all_active_sessions(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;

    /// Mark sessions inactive. Returns how many rows changed.
    fn deactivate_sessions(
        &self,
        session_ids: &[Uuid],
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    // -----------------------------------------------------------------------
    // Messages
    // -----------------------------------------------------------------------

    /// Insert a message and advance the parent session's `last_message_at`
    /// to at least the message's `created_at`, atomically.
    ///
    /// Returns `NotFound` if the session does not exist.
    fn append_message(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Messages for a session, ordered by created_at ASC.
    fn get_messages(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Delete all messages of the given sessions (maintenance only).
    fn delete_messages(
        &self,
        session_ids: &[Uuid],
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    // -----------------------------------------------------------------------
    // Stats
    // -----------------------------------------------------------------------

    fn count_active_sessions(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    fn count_messages(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
