//! HTTP/REST API layer for Stratifi.
//!
//! Two surfaces share one router: the agent endpoints (`/create_agent`,
//! `/chat_with_agent`) with flat `{success, ...}` bodies, and the session API
//! under `/api/v1/` with the envelope response format.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
