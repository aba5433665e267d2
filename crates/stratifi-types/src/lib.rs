//! Shared domain types for Stratifi.
//!
//! This crate contains the core domain types used across the Stratifi backend:
//! users, chat sessions and messages, agent wallets, user activities, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod activity;
pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod user;
