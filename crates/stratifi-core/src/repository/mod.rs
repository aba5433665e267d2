//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (stratifi-infra) implements. The core crate never depends on any
//! specific storage technology.
//!
//! Writes that hit a unique constraint must surface as
//! `RepositoryError::Conflict` so services can resolve races by re-querying.

pub mod agent;
pub mod chat;
pub mod user;
