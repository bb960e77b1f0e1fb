//! Main entry point for the launcher binary

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::{error, warn};

use dcub_launcher::services::{BrowserShell, RealPortScanner, RealProcessManager, RealServerProbe};
use dcub_launcher::{logging, AppOrchestrator, LauncherConfig};

/// Launcher for the DCUB codon-optimization suite
#[derive(Parser)]
#[command(name = "dcub-launcher")]
#[command(about = "Starts the bundled web server and optimization backend, then opens the UI")]
struct Args {
    /// Pre-built web-server entry point (e.g. .next/standalone/server.js)
    #[arg(long)]
    server_entry: PathBuf,

    /// Optimization-backend executable
    #[arg(long)]
    backend: PathBuf,

    /// Port the web server is forced onto
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Runtime used to execute the server entry point
    #[arg(long, default_value = "node")]
    server_command: String,

    /// Overall readiness deadline in seconds
    #[arg(long, default_value = "15")]
    ready_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Do not open a browser window, just log the URL
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init_tracing(&args.log_level);

    let config = LauncherConfig::new(args.server_entry, args.backend)
        .with_server_port(args.port)
        .with_server_command(args.server_command)
        .with_ready_timeout(Duration::from_secs(args.ready_timeout));

    let shell = if args.headless {
        BrowserShell::headless()
    } else {
        BrowserShell::new()
    };

    let mut orchestrator = AppOrchestrator::new(
        config,
        RealPortScanner::new(),
        RealServerProbe::new(),
        RealProcessManager::new(),
        shell,
    );

    // Ctrl+C stands in for the window-close event.
    let shutdown_sender = orchestrator.get_shutdown_sender();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_sender.send(()).await;
            }
            Err(err) => warn!(%err, "signal handling failed"),
        }
    });

    if let Err(err) = orchestrator.start().await {
        error!(%err, "failed to start application");
        std::process::exit(1);
    }

    if let Err(err) = orchestrator.run().await {
        error!(%err, "application terminated abnormally");
        std::process::exit(1);
    }
}
