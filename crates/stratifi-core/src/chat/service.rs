//! Chat service orchestrating session lifecycle and message persistence.
//!
//! ChatService owns the context-deduplication flow (find-or-create exactly
//! one active session per user and `{token, poolId, action}` tuple), the
//! append-only message log, and duplicate-session cleanup.

use chrono::{Duration, Utc};
use serde::Serialize;
use stratifi_types::chat::{
    ChatMessage, ChatSession, MessageMetadata, MessageRole, SessionContext, SessionMetadata,
};
use stratifi_types::error::{ChatError, RepositoryError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chat::cleanup::{find_duplicate_sessions, CleanupReport};
use crate::chat::greeting::asset_details_message;
use crate::hash::ContentHasher;
use crate::repository::chat::ChatRepository;

/// A context session together with its message history.
#[derive(Debug, Clone, Serialize)]
pub struct OpenedSession {
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
    /// True when this call created the session.
    pub created: bool,
}

/// Orchestrates chat session lifecycle and message persistence.
///
/// Generic over `ChatRepository` and `ContentHasher` so stratifi-core never
/// depends on stratifi-infra.
pub struct ChatService<C: ChatRepository, H: ContentHasher> {
    chat_repo: C,
    hasher: H,
}

impl<C: ChatRepository, H: ContentHasher> ChatService<C, H> {
    pub fn new(chat_repo: C, hasher: H) -> Self {
        Self { chat_repo, hasher }
    }

    /// Access the chat repository.
    pub fn chat_repo(&self) -> &C {
        &self.chat_repo
    }

    /// Store-level idempotency key for `(user, context)`.
    ///
    /// Each field is length-prefixed so no two distinct tuples encode alike.
    pub fn context_key(&self, user_id: &Uuid, context: &SessionContext) -> String {
        let user = user_id.to_string();
        let encoded: String = [
            user.as_str(),
            context.token.as_str(),
            context.pool_id.as_str(),
            context.action.as_str(),
        ]
        .iter()
        .map(|field| format!("{}:{field};", field.len()))
        .collect();
        self.hasher.compute_hash(&encoded)
    }

    // --- Sessions ---

    /// Active sessions for a user, most recent activity first.
    pub async fn list(&self, user_id: &Uuid) -> Result<Vec<ChatSession>, ChatError> {
        Ok(self.chat_repo.list_active_sessions(user_id).await?)
    }

    /// Find or create the session for `context`.
    ///
    /// Without a context a new session is always created. With one, a match in
    /// `sessions` is reused; otherwise a session carrying the context key is
    /// created, and a concurrent creator's session is returned if it won.
    pub async fn get_or_create_session(
        &self,
        user_id: Uuid,
        sessions: &[ChatSession],
        context: Option<&SessionContext>,
    ) -> Result<ChatSession, ChatError> {
        let (session, _) = self.get_or_create_inner(user_id, sessions, context).await?;
        Ok(session)
    }

    async fn get_or_create_inner(
        &self,
        user_id: Uuid,
        sessions: &[ChatSession],
        context: Option<&SessionContext>,
    ) -> Result<(ChatSession, bool), ChatError> {
        let Some(context) = context else {
            let now = Utc::now();
            let session = ChatSession {
                id: Uuid::now_v7(),
                user_id,
                session_name: Some(format!("Chat {}", now.format("%Y-%m-%d"))),
                metadata: SessionMetadata::default(),
                context_key: None,
                created_at: now,
                last_message_at: now,
                is_active: true,
            };
            let created = self.chat_repo.create_session(&session).await?;
            info!(session_id = %created.id, user_id = %user_id, "Created chat session");
            return Ok((created, true));
        };

        if let Some(existing) = sessions
            .iter()
            .find(|s| s.is_active && s.user_id == user_id && s.matches_context(context))
        {
            debug!(
                session_id = %existing.id,
                handled_key = %context.handled_key(&user_id),
                "Reusing session for context"
            );
            return Ok((existing.clone(), false));
        }

        let key = self.context_key(&user_id, context);
        let now = Utc::now();
        let session = ChatSession {
            id: Uuid::now_v7(),
            user_id,
            session_name: Some(context.session_name()),
            metadata: SessionMetadata {
                initial_context: Some(context.clone()),
                ..Default::default()
            },
            context_key: Some(key.clone()),
            created_at: now,
            last_message_at: now,
            is_active: true,
        };

        match self.chat_repo.create_session(&session).await {
            Ok(created) => {
                info!(
                    session_id = %created.id,
                    handled_key = %context.handled_key(&user_id),
                    "Created context session"
                );
                Ok((created, true))
            }
            Err(RepositoryError::Conflict(_)) => {
                debug!(user_id = %user_id, "Context session already exists, re-querying");
                let existing = self
                    .chat_repo
                    .find_by_context_key(&user_id, &key)
                    .await?
                    .ok_or(RepositoryError::NotFound)?;
                if !existing.matches_context(context) {
                    warn!(
                        session_id = %existing.id,
                        handled_key = %context.handled_key(&user_id),
                        "Context key is held by a session for another context"
                    );
                    return Err(RepositoryError::Conflict(
                        "context key held by a different context".to_string(),
                    )
                    .into());
                }
                Ok((existing, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open the session for `context`: reuse it with its history, or create
    /// it and post the asset-details greeting.
    pub async fn open_context_session(
        &self,
        user_id: Uuid,
        context: &SessionContext,
        wallet: Option<&str>,
    ) -> Result<OpenedSession, ChatError> {
        let sessions = self.list(&user_id).await?;
        let (session, created) = self
            .get_or_create_inner(user_id, &sessions, Some(context))
            .await?;

        if created {
            let greeting = asset_details_message(context, wallet);
            if let Err(e) = self
                .append(session.id, MessageRole::Assistant, greeting, None)
                .await
            {
                warn!(session_id = %session.id, error = %e, "Failed to post context greeting");
            }
        }

        let messages = self.chat_repo.get_messages(&session.id).await?;
        Ok(OpenedSession {
            session,
            messages,
            created,
        })
    }

    /// Mark a session inactive. Already-inactive sessions are left alone.
    pub async fn deactivate(&self, session_id: &Uuid) -> Result<(), ChatError> {
        let session = self
            .chat_repo
            .get_session(session_id)
            .await?
            .ok_or(ChatError::SessionNotFound)?;
        if session.is_active {
            self.chat_repo.deactivate_sessions(&[session.id]).await?;
            info!(session_id = %session_id, "Session deactivated");
        }
        Ok(())
    }

    // --- Messages ---

    /// Append a message and advance the session's `last_message_at`.
    ///
    /// Returns the stored row so callers can extend their local list
    /// without re-fetching.
    pub async fn append(
        &self,
        session_id: Uuid,
        role: MessageRole,
        content: String,
        metadata: Option<MessageMetadata>,
    ) -> Result<ChatMessage, ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let session = self
            .chat_repo
            .get_session(&session_id)
            .await?
            .ok_or(ChatError::SessionNotFound)?;
        if !session.is_active {
            return Err(ChatError::SessionNotFound);
        }

        let message = ChatMessage {
            id: Uuid::now_v7(),
            session_id,
            role,
            content,
            created_at: Utc::now(),
            metadata,
        };

        match self.chat_repo.append_message(&message).await {
            Ok(()) => Ok(message),
            Err(RepositoryError::NotFound) => Err(ChatError::SessionNotFound),
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Failed to append message");
                Err(e.into())
            }
        }
    }

    /// Messages of a session in creation order.
    pub async fn messages(&self, session_id: &Uuid) -> Result<Vec<ChatMessage>, ChatError> {
        if self.chat_repo.get_session(session_id).await?.is_none() {
            return Err(ChatError::SessionNotFound);
        }
        Ok(self.chat_repo.get_messages(session_id).await?)
    }

    // --- Maintenance ---

    /// Deactivate sessions created within `window` of a newer session of the
    /// same user, and delete their messages. `dry_run` only reports.
    pub async fn cleanup_duplicates(
        &self,
        window: Duration,
        dry_run: bool,
    ) -> Result<CleanupReport, ChatError> {
        let sessions = self.chat_repo.list_all_active_sessions().await?;
        let duplicates = find_duplicate_sessions(&sessions, window);

        let mut report = CleanupReport {
            scanned: sessions.len(),
            duplicates,
            dry_run,
            ..Default::default()
        };

        if dry_run || report.duplicates.is_empty() {
            return Ok(report);
        }

        report.deactivated = self.chat_repo.deactivate_sessions(&report.duplicates).await?;
        report.messages_deleted = self.chat_repo.delete_messages(&report.duplicates).await?;
        info!(
            scanned = report.scanned,
            deactivated = report.deactivated,
            messages_deleted = report.messages_deleted,
            "Duplicate session cleanup finished"
        );
        Ok(report)
    }
}
