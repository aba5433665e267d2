//! Infrastructure layer for Stratifi.
//!
//! Contains implementations of the ports defined in `stratifi-core`:
//! SQLite storage, cryptographic operations (AES-256-GCM vault, SHA-256
//! hashing), EVM key generation, the upstream agent HTTP client, and the
//! configuration loader.

pub mod agent_client;
pub mod config;
pub mod crypto;
pub mod sqlite;
pub mod wallet;
