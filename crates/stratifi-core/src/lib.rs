//! Business logic and repository trait definitions for Stratifi.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus the services built on them: identity resolution,
//! session deduplication and message logging, and agent chat turns.
//! It depends only on `stratifi-types` -- never on `stratifi-infra` or any
//! database/IO crate.

pub mod agent;
pub mod chat;
pub mod hash;
pub mod identity;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;
