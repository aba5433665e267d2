//! CLI command definitions for the `stratifi` binary.

pub mod session;
pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Lending assistant backend: wallet identity, chat sessions, and agents.
#[derive(Parser)]
#[command(name = "stratifi", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Port to listen on (defaults to config, then 3000).
        #[arg(long, short)]
        port: Option<u16>,

        /// Host to bind to (defaults to config, then 127.0.0.1).
        #[arg(long)]
        host: Option<String>,
    },

    /// Chat session maintenance.
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Show store counts and configuration.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Deactivate duplicate sessions created close together.
    Cleanup {
        /// Sessions of one user created within this many minutes of a newer one are duplicates.
        #[arg(long)]
        window_minutes: Option<i64>,

        /// Report duplicates without changing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// List the active sessions of a wallet.
    #[command(alias = "ls")]
    List {
        /// Wallet address (any case).
        wallet: String,
    },
}
