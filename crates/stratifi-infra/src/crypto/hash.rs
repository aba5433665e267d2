//! SHA-256 content hashing.
//!
//! Implements the `ContentHasher` trait from `stratifi-core` using the
//! `sha2` crate (RustCrypto ecosystem).

use sha2::{Digest, Sha256};

use stratifi_core::hash::ContentHasher;

/// SHA-256 implementation of `ContentHasher`.
///
/// Computes lowercase hex-encoded digests. `ChatService` uses it to derive
/// the per-user context key of a session.
pub struct Sha256ContentHasher;

impl Sha256ContentHasher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Sha256ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHasher for Sha256ContentHasher {
    fn compute_hash(&self, content: &str) -> String {
        hex::encode(Sha256::digest(content.as_bytes()))
    }
}
