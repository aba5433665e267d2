//! Envelope response format for the `/api/v1` routes.
//!
//! ```json
//! {
//!   "data": { ... },
//!   "meta": { "request_id": "...", "timestamp": "...", "response_time_ms": 5 },
//!   "errors": [],
//!   "_links": { "self": "..." }
//! }
//! ```

use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

/// Envelope wrapping all v1 API data.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    pub meta: ApiMeta,

    /// Empty on success.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiErrorDetail>,

    #[serde(rename = "_links", skip_serializing_if = "HashMap::is_empty")]
    pub links: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct ApiMeta {
    pub request_id: String,
    pub timestamp: String,
    pub response_time_ms: u64,
}

impl ApiMeta {
    fn new(request_id: String, response_time_ms: u64) -> Self {
        Self {
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
            response_time_ms,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code, e.g. `SESSION_NOT_FOUND`.
    pub code: String,
    pub message: String,
}

/// Request id and start time for one handler invocation.
pub struct RequestTimer {
    request_id: String,
    started: Instant,
}

impl RequestTimer {
    pub fn start() -> Self {
        Self {
            request_id: Uuid::now_v7().to_string(),
            started: Instant::now(),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Wrap `data` in a success envelope.
    pub fn finish<T: Serialize>(self, data: T) -> ApiResponse<T> {
        let elapsed = self.elapsed_ms();
        ApiResponse {
            data: Some(data),
            meta: ApiMeta::new(self.request_id, elapsed),
            errors: Vec::new(),
            links: HashMap::new(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Add a HATEOAS link.
    pub fn with_link(mut self, rel: &str, href: &str) -> Self {
        self.links.insert(rel.to_string(), href.to_string());
        self
    }
}

impl ApiResponse<()> {
    /// Error envelope with no data.
    pub fn error(code: &str, message: &str) -> Self {
        Self {
            data: None,
            meta: ApiMeta::new(Uuid::now_v7().to_string(), 0),
            errors: vec![ApiErrorDetail {
                code: code.to_string(),
                message: message.to_string(),
            }],
            links: HashMap::new(),
        }
    }
}
