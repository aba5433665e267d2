//! Error types mapping domain errors to HTTP responses.
//!
//! [`AppError`] renders the `/api/v1` envelope. [`AgentApiError`] renders the
//! flat `{success: false, error}` body of the agent endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use stratifi_types::error::{AgentError, ChatError, IdentityError, RepositoryError};

use crate::http::response::ApiResponse;

/// Application-level error for the envelope routes.
#[derive(Debug)]
pub enum AppError {
    Identity(IdentityError),
    Chat(ChatError),
    /// A referenced user does not exist.
    UserNotFound,
    Validation(String),
    Internal(String),
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        AppError::Identity(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<AgentError> for AppError {
    fn from(e: AgentError) -> Self {
        match e {
            AgentError::Identity(e) => AppError::Identity(e),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Identity(IdentityError::InvalidAddress) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Invalid wallet address".to_string(),
            ),
            AppError::Chat(ChatError::SessionNotFound) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Session not found".to_string(),
            ),
            AppError::Chat(ChatError::EmptyMessage) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Message content is empty".to_string(),
            ),
            AppError::UserNotFound => (
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Identity(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "IDENTITY_ERROR", e.to_string())
            }
            AppError::Chat(e) => (StatusCode::INTERNAL_SERVER_ERROR, "CHAT_ERROR", e.to_string()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        }
        (status, Json(ApiResponse::error(code, &message))).into_response()
    }
}

/// Error for the agent endpoints.
#[derive(Debug)]
pub enum AgentApiError {
    Agent(AgentError),
    /// The request body was not valid JSON for the endpoint.
    BadRequest(String),
}

impl From<AgentError> for AgentApiError {
    fn from(e: AgentError) -> Self {
        AgentApiError::Agent(e)
    }
}

impl IntoResponse for AgentApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AgentApiError::Agent(e @ AgentError::MissingParameters(_)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AgentApiError::Agent(AgentError::Identity(IdentityError::InvalidAddress)) => {
                (StatusCode::BAD_REQUEST, "Invalid wallet address".to_string())
            }
            AgentApiError::Agent(e @ AgentError::AgentNotFound) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            AgentApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AgentApiError::Agent(e) => {
                // Details stay in the log; callers get a generic message.
                tracing::error!(error = %e, "Agent request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::Chat(ChatError::SessionNotFound).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Identity(IdentityError::InvalidAddress)
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(RepositoryError::Connection).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_agent_error_status_codes() {
        let missing = AgentApiError::from(AgentError::MissingParameters("chain_id".into()));
        assert_eq!(missing.into_response().status(), StatusCode::BAD_REQUEST);

        let not_found = AgentApiError::from(AgentError::AgentNotFound);
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let internal = AgentApiError::from(AgentError::Encryption);
        assert_eq!(
            internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
