use thiserror::Error;

/// Errors from repository operations (used by trait definitions in stratifi-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    /// A unique constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from resolving a wallet address to a user.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid wallet address")]
    InvalidAddress,

    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
}

/// Errors from session and message operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("session not found")]
    SessionNotFound,

    #[error("message content is empty")]
    EmptyMessage,

    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
}

/// Errors from agent creation and agent chat turns.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Missing required parameters: {0}")]
    MissingParameters(String),

    #[error("Agent not found or unauthorized")]
    AgentNotFound,

    #[error("failed to generate wallet: {0}")]
    KeyGeneration(String),

    /// Never carries key material.
    #[error("failed to protect agent key")]
    Encryption,

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
}

/// Errors from the upstream agent service. Always recoverable via fallback.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream agent unreachable: {0}")]
    Unreachable(String),

    #[error("upstream agent timed out")]
    Timeout,

    #[error("upstream agent returned status {0}")]
    BadStatus(u16),

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}
