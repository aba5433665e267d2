//! System status command.

use anyhow::Result;
use console::style;

use stratifi_core::repository::agent::AgentRepository;
use stratifi_core::repository::chat::ChatRepository;
use stratifi_core::repository::user::UserRepository;

use crate::state::AppState;

/// Display store counts, version, and where data lives.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let users = state.identity.user_repo().count_users().await?;
    let sessions = state.chat_service.chat_repo().count_active_sessions().await?;
    let messages = state.chat_service.chat_repo().count_messages().await?;
    let agents = state.agent_service.agent_repo().count_agents().await?;
    let remote = state.agent_service.remote_enabled();

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "users": users,
            "active_sessions": sessions,
            "messages": messages,
            "agents": agents,
            "remote_agent": {
                "enabled": remote,
                "url": state.config.agent.url,
            },
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Stratifi v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Store ──").dim());
    println!("  Users:           {}", style(users).bold());
    println!("  Active sessions: {}", style(sessions).green());
    println!("  Messages:        {}", style(messages).bold());
    println!("  Agents:          {}", style(agents).bold());
    println!();

    println!("  {}", style("── Agent backend ──").dim());
    if remote {
        println!(
            "  {} ({}s timeout)",
            style(&state.config.agent.url).cyan(),
            state.config.agent.timeout_secs
        );
    } else {
        println!("  {}", style("disabled, local replies only").yellow());
    }
    println!();

    println!("  {}", style("── Storage ──").dim());
    println!("  Data: {}", style(state.data_dir.display()).dim());
    println!();

    Ok(())
}
