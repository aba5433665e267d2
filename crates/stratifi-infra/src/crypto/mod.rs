//! Cryptographic operations for Stratifi.
//!
//! - `hash`: SHA-256 hashing for session context keys
//! - `vault`: AES-256-GCM encryption for agent private keys at rest

pub mod hash;
pub mod vault;
