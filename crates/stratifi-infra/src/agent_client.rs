//! HTTP client for the remote agent service.
//!
//! Sends `POST {base_url}/chat` with `{message, session_id, user_id}` and
//! reads `{response}` back. Every failure maps to an `UpstreamError`, which
//! the response generator answers with the local fallback.

use std::time::Duration;

use serde::Deserialize;
use stratifi_core::agent::backend::{AgentBackend, AgentRequest};
use stratifi_types::config::AgentBackendConfig;
use stratifi_types::error::UpstreamError;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ChatReply {
    /// A missing field is treated as an empty reply.
    #[serde(default)]
    response: String,
}

/// `AgentBackend` over reqwest.
#[derive(Debug, Clone)]
pub struct RemoteAgentClient {
    base_url: String,
    http: reqwest::Client,
}

impl RemoteAgentClient {
    /// Fails when the HTTP client (TLS backend included) cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent("stratifi-agent-client/0.1")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(config: &AgentBackendConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.url.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }
}

fn map_send_error(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Unreachable(e.to_string())
    }
}

impl AgentBackend for RemoteAgentClient {
    async fn chat(&self, request: &AgentRequest) -> Result<String, UpstreamError> {
        let url = self.chat_url();
        debug!(url = %url, session_id = %request.session_id, "Calling remote agent");

        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::BadStatus(status.as_u16()));
        }

        let body = resp.bytes().await.map_err(map_send_error)?;
        let reply: ChatReply = serde_json::from_slice(&body)
            .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))?;
        Ok(reply.response)
    }
}
