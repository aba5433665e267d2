//! ContentHasher trait for computing idempotency keys.
//!
//! Defined in stratifi-core so services can hash content without coupling to
//! a specific hashing algorithm. The `Sha256ContentHasher` adapter lives in
//! stratifi-infra.

/// Abstraction over content hashing.
///
/// Used by `ChatService` to derive the per-user context key that makes
/// "one active session per context tuple" enforceable by the store.
pub trait ContentHasher: Send + Sync {
    /// Compute a hex-encoded hash of the given content.
    fn compute_hash(&self, content: &str) -> String;
}
