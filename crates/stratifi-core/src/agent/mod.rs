//! Custodial agent wallets and agent chat turns.
//!
//! The service validates requests, owns the per-session scratchpad, and picks
//! between the remote agent and the local heuristic for each reply.

pub mod backend;
pub mod heuristic;
pub mod intent;
pub mod keys;
pub mod prompt;
pub mod service;
