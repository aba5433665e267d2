//! Agent repository trait definition.
//!
//! Covers three entity families:
//! - **Agent wallets:** one generated wallet per (user wallet, chain).
//! - **Scratchpads:** running transcript per chat session.
//! - **Activities:** wallet actions proposed or executed for a user.

use stratifi_types::activity::UserActivity;
use stratifi_types::agent::{AgentScratchpad, AgentWallet};
use stratifi_types::error::RepositoryError;

/// Repository trait for agent wallet, scratchpad, and activity persistence.
pub trait AgentRepository: Send + Sync {
    // -----------------------------------------------------------------------
    // Agent wallets
    // -----------------------------------------------------------------------

    /// Find the agent for a (normalized) user wallet on a chain.
    fn find_agent(
        &self,
        user_wallet_address: &str,
        chain_id: u64,
    ) -> impl std::future::Future<Output = Result<Option<AgentWallet>, RepositoryError>> + Send;

    /// Get an agent by its id.
    fn get_agent(
        &self,
        agent_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<AgentWallet>, RepositoryError>> + Send;

    /// Insert an agent. Returns `Conflict` if one already exists for the
    /// (user wallet, chain) pair.
    fn insert_agent(
        &self,
        agent: &AgentWallet,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn count_agents(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    // -----------------------------------------------------------------------
    // Scratchpads
    // -----------------------------------------------------------------------

    fn get_scratchpad(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<AgentScratchpad>, RepositoryError>> + Send;

    /// Insert or replace the scratchpad for its session.
    fn upsert_scratchpad(
        &self,
        scratchpad: &AgentScratchpad,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    // -----------------------------------------------------------------------
    // Activities
    // -----------------------------------------------------------------------

    fn record_activity(
        &self,
        activity: &UserActivity,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Activities for a user wallet, newest first.
    fn list_activities(
        &self,
        user_wallet_address: &str,
    ) -> impl std::future::Future<Output = Result<Vec<UserActivity>, RepositoryError>> + Send;
}
