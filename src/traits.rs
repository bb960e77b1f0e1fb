//! Trait definitions with mockall annotations for testing
//!
//! Dependency-injection seams for the launcher: port inspection, readiness
//! probing, child-process management and the window shell. The orchestrator
//! is generic over these so tests can drive every startup and failure path
//! without spawning real processes.

use std::time::Duration;

use tokio::sync::mpsc;
use url::Url;

use crate::config::LauncherConfig;
use crate::error::LauncherResult;

/// Handle for the spawned web-server child.
///
/// The process manager retains ownership of the OS process; this handle only
/// carries the pid and the channel on which the exit watcher reports.
#[derive(Debug)]
pub struct WebServerHandle {
    pub pid: u32,
    exit_rx: mpsc::Receiver<i32>,
    // Kept alive when no watcher task exists, so `exited` stays pending
    // instead of observing a closed channel.
    _exit_tx: Option<mpsc::Sender<i32>>,
}

impl WebServerHandle {
    pub fn new(pid: u32, exit_rx: mpsc::Receiver<i32>) -> Self {
        Self {
            pid,
            exit_rx,
            _exit_tx: None,
        }
    }

    /// Handle for a child that will never report an exit on its own.
    pub fn idle(pid: u32) -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            pid,
            exit_rx: rx,
            _exit_tx: Some(tx),
        }
    }

    /// Resolves with the exit code once the child terminates on its own.
    /// Pending forever if the watcher is gone without reporting.
    pub async fn exited(&mut self) -> i32 {
        match self.exit_rx.recv().await {
            Some(code) => code,
            None => std::future::pending().await,
        }
    }
}

/// Port occupancy inspection and termination
///
/// Backs the port reaper: enumerate pids listening on a local TCP port and
/// request their termination before the web server is launched.
#[mockall::automock]
#[async_trait::async_trait]
pub trait PortScanner: Send + Sync {
    /// List pids currently listening on `port` on the local host.
    async fn pids_on_port(&self, port: u16) -> LauncherResult<Vec<u32>>;

    /// Request termination of a single process.
    async fn kill(&self, pid: u32) -> LauncherResult<()>;
}

/// Single HTTP readiness probe
///
/// One GET with its own timeout; any response at all counts as ready.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ServerProbe: Send + Sync {
    async fn probe(&self, url: &Url, timeout: Duration) -> LauncherResult<()>;
}

/// Child-process management for the two launcher-owned processes
///
/// At most one web-server child and one backend child exist at a time;
/// the implementation owns the OS handles and kills them on `stop_all`.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ProcessManager: Send + Sync {
    /// Spawn the bundled web server after checking its build artifacts.
    /// Missing artifacts abort without a spawn attempt.
    async fn spawn_web_server(&self, config: &LauncherConfig) -> LauncherResult<WebServerHandle>;

    /// Spawn the optimization backend; returns its pid. Errors here are
    /// non-fatal to the caller by contract.
    async fn spawn_backend(&self, config: &LauncherConfig) -> LauncherResult<u32>;

    /// Send both children a termination signal, best-effort.
    async fn stop_all(&self) -> LauncherResult<()>;
}

/// The application window
///
/// Abstracts "show the UI at this URL" so the orchestrator can be tested
/// headless and the desktop build can plug in its own webview.
#[mockall::automock]
#[async_trait::async_trait]
pub trait WindowShell: Send + Sync {
    async fn show_window(&self, url: &Url) -> LauncherResult<()>;
}
