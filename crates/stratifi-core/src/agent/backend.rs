//! Response generation for agent chat turns.
//!
//! `ResponseGenerator` asks the remote agent service when one is configured
//! and falls back to the local heuristic on any upstream failure. A chat
//! turn never fails because of the upstream.

use serde::{Deserialize, Serialize};
use stratifi_types::agent::ResponseSource;
use stratifi_types::error::UpstreamError;
use tracing::warn;

use crate::agent::heuristic::fallback_response;

/// Reply used when the remote agent answers with an empty response.
pub const EMPTY_RESPONSE_TEXT: &str =
    "I apologize, but I encountered an issue processing your request.";

/// Body of `POST {AGENT_BACKEND_URL}/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    pub message: String,
    pub session_id: String,
    pub user_id: String,
}

/// Port for the remote agent service. Implemented in stratifi-infra.
pub trait AgentBackend: Send + Sync {
    /// Send one turn upstream and return the reply text (possibly empty).
    fn chat(
        &self,
        request: &AgentRequest,
    ) -> impl std::future::Future<Output = Result<String, UpstreamError>> + Send;
}

/// A generated reply and which generator produced it.
#[derive(Debug, Clone)]
pub struct GeneratedResponse {
    pub text: String,
    pub source: ResponseSource,
}

/// Chooses between the remote agent and the local heuristic.
pub struct ResponseGenerator<B: AgentBackend> {
    backend: Option<B>,
}

impl<B: AgentBackend> ResponseGenerator<B> {
    /// Generator that tries `backend` first.
    pub fn remote(backend: B) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Generator that always answers locally.
    pub fn local_only() -> Self {
        Self { backend: None }
    }

    pub fn has_remote(&self) -> bool {
        self.backend.is_some()
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    /// Produce a reply. `user_message` and `chain` drive the local fallback.
    pub async fn generate(
        &self,
        request: &AgentRequest,
        user_message: &str,
        chain: &str,
    ) -> GeneratedResponse {
        if let Some(backend) = &self.backend {
            match backend.chat(request).await {
                Ok(text) => {
                    let text = if text.trim().is_empty() {
                        EMPTY_RESPONSE_TEXT.to_string()
                    } else {
                        text
                    };
                    return GeneratedResponse {
                        text,
                        source: ResponseSource::RemoteAgent,
                    };
                }
                Err(e) => {
                    warn!(
                        session_id = %request.session_id,
                        error = %e,
                        "Agent backend failed, using local fallback"
                    );
                }
            }
        }

        GeneratedResponse {
            text: fallback_response(user_message, chain),
            source: ResponseSource::LocalHeuristic,
        }
    }
}
