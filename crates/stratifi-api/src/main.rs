//! Stratifi CLI and HTTP server entry point.
//!
//! Binary name: `stratifi`
//!
//! Loads `.env` and configuration, initializes tracing, database, and
//! services, then dispatches to a command handler or starts the server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, SessionAction};
use state::AppState;
use stratifi_infra::config::RuntimeConfig;
use stratifi_observe::tracing_setup::{init_tracing, shutdown_tracing, LogLevel};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "stratifi", &mut std::io::stdout());
        return Ok(());
    }

    let runtime = RuntimeConfig::from_env().await;

    init_tracing(LogLevel::from_flags(cli.quiet, cli.verbose), runtime.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli, &runtime).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli, runtime: &RuntimeConfig) -> anyhow::Result<()> {
    let state = AppState::init(runtime).await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Stratifi API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }
            tracing::info!(%addr, remote_agent = state.config.agent.enabled, "Server started");

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Sessions { action } => match action {
            SessionAction::Cleanup {
                window_minutes,
                dry_run,
            } => {
                cli::session::cleanup(&state, window_minutes, dry_run, cli.json).await?;
            }
            SessionAction::List { wallet } => {
                cli::session::list(&state, &wallet, cli.json).await?;
            }
        },

        Commands::Status => {
            cli::status::status(&state, cli.json).await?;
        }

        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
