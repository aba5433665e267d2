//! Agent HTTP handlers.
//!
//! Endpoints (also mounted under `/api/`):
//! - POST /create_agent     - Create (or return) the agent wallet for a user and chain
//! - POST /chat_with_agent  - One chat turn with the user's agent
//!
//! Bodies are flat JSON: `{success: true, ...}` or `{success: false, error}`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use stratifi_core::agent::service::{ChatTurnRequest, CreateAgentRequest};
use stratifi_types::agent::WalletAction;

use crate::http::error::AgentApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreateAgentResponse {
    pub success: bool,
    pub agent_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatWithAgentResponse {
    pub success: bool,
    pub response: String,
    #[serde(rename = "walletAction", skip_serializing_if = "Option::is_none")]
    pub wallet_action: Option<WalletAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_scratchpad: Option<String>,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AgentApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| AgentApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))
}

/// POST /create_agent
pub async fn create_agent(
    State(state): State<AppState>,
    payload: Result<Json<CreateAgentRequest>, JsonRejection>,
) -> Result<Json<CreateAgentResponse>, AgentApiError> {
    let request = body(payload)?;
    let agent = state.agent_service.create_agent(&request).await?;

    Ok(Json(CreateAgentResponse {
        success: true,
        agent_id: agent.agent_id,
    }))
}

/// POST /chat_with_agent
pub async fn chat_with_agent(
    State(state): State<AppState>,
    payload: Result<Json<ChatTurnRequest>, JsonRejection>,
) -> Result<Json<ChatWithAgentResponse>, AgentApiError> {
    let request = body(payload)?;
    let turn = state.agent_service.chat(&request).await?;

    tracing::debug!(source = ?turn.source, has_action = turn.wallet_action.is_some(), "Agent turn complete");

    Ok(Json(ChatWithAgentResponse {
        success: true,
        response: turn.response,
        wallet_action: turn.wallet_action,
        agent_scratchpad: Some(turn.scratchpad),
    }))
}
