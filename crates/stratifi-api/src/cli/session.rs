//! Session maintenance commands.

use anyhow::{bail, Result};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use stratifi_core::repository::user::UserRepository;
use stratifi_types::user::normalize_wallet_address;

use crate::state::AppState;

/// Deactivate duplicate sessions and delete their messages.
pub async fn cleanup(
    state: &AppState,
    window_minutes: Option<i64>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let minutes = window_minutes.unwrap_or(state.config.cleanup_window_minutes);
    if minutes <= 0 {
        bail!("--window-minutes must be positive");
    }

    let report = state
        .chat_service
        .cleanup_duplicates(chrono::Duration::minutes(minutes), dry_run)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    if report.duplicates.is_empty() {
        println!(
            "  {} No duplicate sessions among {} active",
            style("✓").green().bold(),
            report.scanned
        );
        println!();
        return Ok(());
    }

    let verb = if dry_run { "Would deactivate" } else { "Deactivated" };
    println!(
        "  {} {verb} {} of {} active sessions (window: {minutes} min)",
        style("🧹").bold(),
        style(report.duplicates.len()).yellow().bold(),
        report.scanned
    );
    for id in &report.duplicates {
        println!("    {}", style(id).dim());
    }
    if !dry_run {
        println!(
            "  {} messages deleted",
            style(report.messages_deleted).bold()
        );
    }
    println!();

    Ok(())
}

/// List the active sessions of a wallet without creating the user.
pub async fn list(state: &AppState, wallet: &str, json: bool) -> Result<()> {
    let Some(normalized) = normalize_wallet_address(wallet) else {
        bail!("wallet address is empty");
    };

    let Some(user) = state.identity.user_repo().find_by_wallet(&normalized).await? else {
        if json {
            println!("[]");
        } else {
            println!();
            println!("  No user for {}", style(&normalized).cyan());
            println!();
        }
        return Ok(());
    };

    let sessions = state.chat_service.list(&user.id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!("  No active sessions.");
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Session").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Context").fg(Color::White),
        Cell::new("Last Message").fg(Color::White),
    ]);

    for session in &sessions {
        let context = session
            .metadata
            .initial_context
            .as_ref()
            .map(|c| format!("{} {} @ {}", c.action, c.token, c.pool_id))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(session.id).fg(Color::Cyan),
            Cell::new(session.session_name.as_deref().unwrap_or("-")),
            Cell::new(context),
            Cell::new(session.last_message_at.format("%Y-%m-%d %H:%M")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}
