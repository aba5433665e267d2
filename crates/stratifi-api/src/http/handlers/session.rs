//! Chat session HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/v1/users/{id}/sessions     - Active sessions of a user
//! - POST   /api/v1/users/{id}/sessions     - Open a session (context sessions are reused)
//! - GET    /api/v1/sessions/{id}/messages  - Messages in creation order
//! - POST   /api/v1/sessions/{id}/messages  - Append a message
//! - DELETE /api/v1/sessions/{id}           - Deactivate a session

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stratifi_core::chat::service::OpenedSession;
use stratifi_core::repository::user::UserRepository;
use stratifi_types::chat::{
    ChatMessage, ChatSession, MessageMetadata, MessageRole, SessionContext,
};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionRequest {
    #[serde(default)]
    pub context: Option<SessionContext>,
    /// Shown (shortened) in the greeting of a new context session.
    #[serde(default)]
    pub wallet_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppendMessageRequest {
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub metadata: Option<MessageMetadata>,
}

#[derive(Debug, Serialize)]
pub struct Deactivated {
    pub deactivated: bool,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

async fn require_user(state: &AppState, user_id: &Uuid) -> Result<(), AppError> {
    match state.identity.user_repo().get_user(user_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::UserNotFound),
    }
}

/// GET /api/v1/users/{id}/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ChatSession>>>, AppError> {
    let timer = RequestTimer::start();
    let uid = parse_uuid(&user_id)?;
    require_user(&state, &uid).await?;

    let sessions = state.chat_service.list(&uid).await?;

    Ok(Json(
        timer
            .finish(sessions)
            .with_link("self", &format!("/api/v1/users/{uid}/sessions")),
    ))
}

/// POST /api/v1/users/{id}/sessions
///
/// With a context, the user's active session for it is returned with its
/// history; otherwise a fresh session is created.
pub async fn open_session(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Option<Json<OpenSessionRequest>>,
) -> Result<Json<ApiResponse<OpenedSession>>, AppError> {
    let timer = RequestTimer::start();
    let uid = parse_uuid(&user_id)?;
    require_user(&state, &uid).await?;

    let req = body.map(|Json(r)| r).unwrap_or_default();

    let opened = match &req.context {
        Some(context) => {
            state
                .chat_service
                .open_context_session(uid, context, req.wallet_address.as_deref())
                .await?
        }
        None => {
            let session = state.chat_service.get_or_create_session(uid, &[], None).await?;
            OpenedSession {
                session,
                messages: Vec::new(),
                created: true,
            }
        }
    };

    let link = format!("/api/v1/sessions/{}/messages", opened.session.id);
    Ok(Json(timer.finish(opened).with_link("messages", &link)))
}

/// GET /api/v1/sessions/{id}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, AppError> {
    let timer = RequestTimer::start();
    let sid = parse_uuid(&session_id)?;

    let messages = state.chat_service.messages(&sid).await?;

    Ok(Json(timer.finish(messages)))
}

/// POST /api/v1/sessions/{id}/messages
pub async fn append_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Result<Json<AppendMessageRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChatMessage>>, AppError> {
    let timer = RequestTimer::start();
    let sid = parse_uuid(&session_id)?;
    let Json(req) =
        body.map_err(|e| AppError::Validation(format!("Invalid request body: {}", e.body_text())))?;

    let message = state
        .chat_service
        .append(sid, req.role, req.content, req.metadata)
        .await?;

    Ok(Json(timer.finish(message)))
}

/// DELETE /api/v1/sessions/{id}
pub async fn deactivate_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<Deactivated>>, AppError> {
    let timer = RequestTimer::start();
    let sid = parse_uuid(&session_id)?;

    state.chat_service.deactivate(&sid).await?;

    Ok(Json(timer.finish(Deactivated { deactivated: true })))
}
