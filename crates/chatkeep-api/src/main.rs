//! chatkeep CLI and REST API entry point.
//!
//! Binary name: `chatkeep`
//!
//! Parses CLI arguments, loads configuration, initializes the database and
//! services, then either runs one sweep or starts the REST API server.

mod cli;
mod http;
mod state;

use std::path::Path;

use clap::Parser;

use chatkeep_core::retention::scheduler::sweep_callback;
use chatkeep_infra::config::{load_server_config, resolve_data_dir};
use chatkeep_observe::tracing_setup::{init_tracing, verbosity_filter};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = resolve_data_dir();
    tokio::fs::create_dir_all(&data_dir).await?;
    let config = load_server_config(&data_dir).await;

    init_tracing(verbosity_filter(cli.verbose, cli.quiet), config.log_json)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let state = AppState::init(config, &data_dir).await?;

    match cli.command {
        Commands::Sweep { json } => cli::sweep::run_sweep(&state, json).await?,
        Commands::Serve { port, host } => serve(state, &data_dir, host.as_deref(), port).await?,
    }

    Ok(())
}

/// Run the HTTP server with the auto-clear scheduler until shutdown.
async fn serve(
    state: AppState,
    data_dir: &Path,
    host: Option<&str>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let addr = cli::bind_address(&state.config.bind_address, host, port);

    if state.config.sweep_on_start {
        if let Err(e) = state.retention.sweep_auto_clear().await {
            tracing::error!(error = %e, "startup auto-clear sweep failed");
        }
    }

    let scheduler = state.scheduler.clone();
    scheduler
        .start(
            &state.config.sweep_schedule,
            sweep_callback(state.retention.clone()),
        )
        .await?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, data_dir = %data_dir.display(), "chatkeep API listening");

    let router = http::router::build_router(state);
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    scheduler.stop().await?;
    served?;

    tracing::info!("server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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

    tracing::info!("shutdown signal received");
}
