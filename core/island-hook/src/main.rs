//! island-hook: reports coding-assistant session state to AI Island.
//!
//! Called directly by assistant hooks, once per event. The event payload
//! arrives on stdin; the answer for the host goes to stdout as one JSON
//! object. Diagnostics go to stderr.
//!
//! ## Subcommands
//!
//! - `handle`: Main hook handler, reads JSON from stdin
//! - `probe`: Checks whether the daemon socket is up

mod config;
mod daemon_client;
mod handle;
mod logging;
mod process;

use clap::{Parser, Subcommand};
use config::{HookConfig, EVENT_ENV};
use daemon_client::DaemonClient;
use island_protocol::UNKNOWN_EVENT;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "island-hook")]
#[command(about = "AI Island session state reporter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle a hook event (reads JSON from stdin)
    Handle {
        /// Hook event name, e.g. PreToolUse
        #[arg(long, env = EVENT_ENV, default_value = UNKNOWN_EVENT)]
        event: String,

        /// Daemon socket path (overrides AI_ISLAND_SOCKET)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Check whether the daemon socket exists and accepts connections
    Probe {
        /// Daemon socket path (overrides AI_ISLAND_SOCKET)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    // Dropped when main returns, which flushes the debug log file.
    let _logging_guard = logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Handle { event, socket } => {
            let config = HookConfig::from_env().with_socket_override(socket);
            // The host reads our stdout; never fail its workflow over reporting.
            if let Err(e) = handle::run(&event, &config) {
                tracing::error!(error = %e, "island-hook handle failed");
            }
            ExitCode::SUCCESS
        }
        Commands::Probe { socket } => {
            let config = HookConfig::from_env().with_socket_override(socket);
            probe(&DaemonClient::from_config(&config))
        }
    }
}

/// Prints the probe report as JSON. Fails unless the daemon accepted a connection.
fn probe(client: &DaemonClient) -> ExitCode {
    let report = client.probe();
    tracing::debug!(
        socket = %report.socket.display(),
        exists = report.exists,
        reachable = report.reachable,
        "Probe finished"
    );

    match serde_json::to_string(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "failed to serialize probe report"),
    }

    if report.reachable {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
