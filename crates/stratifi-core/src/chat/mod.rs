//! Chat session lifecycle: context deduplication, the message log, and
//! duplicate-session cleanup.

pub mod cleanup;
pub mod greeting;
pub mod service;
