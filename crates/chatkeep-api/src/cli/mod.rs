//! CLI command definitions for the `chatkeep` binary.

pub mod sweep;

use clap::{Parser, Subcommand};

/// Chat history backend with storage caps and scheduled auto-clear.
#[derive(Parser)]
#[command(name = "chatkeep", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server and the auto-clear scheduler.
    Serve {
        /// Port to listen on. Overrides the port of `bind_address`.
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to. Overrides the host of `bind_address`.
        #[arg(long)]
        host: Option<String>,
    },

    /// Run one auto-clear pass over every user and print the report.
    Sweep {
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Combine the configured bind address with `--host` / `--port` overrides.
pub fn bind_address(configured: &str, host: Option<&str>, port: Option<u16>) -> String {
    let (cfg_host, cfg_port) = configured
        .rsplit_once(':')
        .unwrap_or((configured, "5000"));
    let host = host.unwrap_or(cfg_host);
    match port {
        Some(port) => format!("{host}:{port}"),
        None => format!("{host}:{cfg_port}"),
    }
}
