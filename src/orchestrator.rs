//! Application orchestrator
//!
//! Sequences process start: reap the stale port, launch the bundled web
//! server, poll it for readiness, show the window, launch the optimization
//! backend, and tear both children down on exit. Child handles are fields of
//! the orchestrator instance with explicit lifecycle methods, never ambient
//! globals, so tests can run several independent launchers in one process.
//!
//! The backend is deliberately decoupled from startup: if it fails to spawn
//! the UI still comes up and only job submission degrades.

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::config::LauncherConfig;
use crate::core::{PortReaper, ReadinessPoller};
use crate::error::{LauncherError, LauncherResult};
use crate::traits::{PortScanner, ProcessManager, ServerProbe, WebServerHandle, WindowShell};

/// Startup/shutdown lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherState {
    Idle,
    ReapingPort,
    LaunchingServer,
    WaitingForReady,
    WindowShown,
    LaunchingBackend,
    Running,
    ShuttingDown,
    Terminated,
    Failed,
}

/// Coordinates the web-server child, the backend child and the window.
pub struct AppOrchestrator<S, P, M, W>
where
    S: PortScanner + 'static,
    P: ServerProbe + 'static,
    M: ProcessManager + 'static,
    W: WindowShell + 'static,
{
    config: LauncherConfig,

    /// Injected services
    scanner: S,
    probe: P,
    process_manager: M,
    shell: W,

    state: LauncherState,

    /// At most one of each; replaced only after `stop_all`.
    web_server: Option<WebServerHandle>,
    backend_pid: Option<u32>,

    /// Interrupts an in-flight readiness poll on shutdown.
    cancel_tx: watch::Sender<bool>,

    /// Window-close / signal delivery.
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl<S, P, M, W> AppOrchestrator<S, P, M, W>
where
    S: PortScanner + 'static,
    P: ServerProbe + 'static,
    M: ProcessManager + 'static,
    W: WindowShell + 'static,
{
    pub fn new(config: LauncherConfig, scanner: S, probe: P, process_manager: M, shell: W) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        Self {
            config,
            scanner,
            probe,
            process_manager,
            shell,
            state: LauncherState::Idle,
            web_server: None,
            backend_pid: None,
            cancel_tx,
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn state(&self) -> LauncherState {
        self.state
    }

    pub fn backend_pid(&self) -> Option<u32> {
        self.backend_pid
    }

    /// Sender that requests a clean shutdown (window closed, Ctrl+C).
    pub fn get_shutdown_sender(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Bring the application up. On any fatal error the started children are
    /// signaled for termination and the orchestrator lands in `Failed`;
    /// the caller maps that to a non-zero process exit, no retry.
    pub async fn start(&mut self) -> LauncherResult<()> {
        match self.try_start().await {
            Ok(()) => Ok(()),
            Err(err) => {
                error!(%err, "startup failed");
                self.state = LauncherState::Failed;
                if let Err(stop_err) = self.process_manager.stop_all().await {
                    warn!(%stop_err, "error stopping children after failed startup");
                }
                self.web_server = None;
                self.backend_pid = None;
                Err(err)
            }
        }
    }

    async fn try_start(&mut self) -> LauncherResult<()> {
        // Reap is best-effort: a failed scan must not block the launch.
        self.state = LauncherState::ReapingPort;
        let reaper = PortReaper::new(self.config.reap_grace);
        match reaper.reap(&self.scanner, self.config.server_port).await {
            Ok(0) => debug!(port = self.config.server_port, "port already free"),
            Ok(killed) => info!(
                killed,
                port = self.config.server_port,
                "cleared stale processes from port"
            ),
            Err(err) => warn!(%err, "port reap failed, continuing anyway"),
        }

        self.state = LauncherState::LaunchingServer;
        let handle = self.process_manager.spawn_web_server(&self.config).await?;
        info!(pid = handle.pid, port = self.config.server_port, "web server spawned");
        self.web_server = Some(handle);

        self.state = LauncherState::WaitingForReady;
        let url = self.config.server_url()?;
        let poller = ReadinessPoller::from_config(&self.config);
        let cancel = self.cancel_tx.subscribe();
        let probe = &self.probe;
        let server = self
            .web_server
            .as_mut()
            .ok_or_else(|| LauncherError::config("web server handle missing after spawn"))?;

        // Race readiness against the child dying during startup.
        let report = tokio::select! {
            res = poller.wait_until_ready(probe, &url, cancel) => res?,
            code = server.exited() => {
                return Err(LauncherError::ServerExited { code });
            }
        };
        debug!(attempts = report.attempts, elapsed = ?report.elapsed, "server answered");

        self.state = LauncherState::WindowShown;
        self.shell.show_window(&url).await?;

        // Backend launch is decoupled from server readiness and non-fatal:
        // without it the UI is browsable and only submissions fail.
        self.state = LauncherState::LaunchingBackend;
        match self.process_manager.spawn_backend(&self.config).await {
            Ok(pid) => {
                info!(pid, "optimization backend spawned");
                self.backend_pid = Some(pid);
            }
            Err(err) => {
                warn!(%err, "backend launch failed; job submissions will not reach the optimizer");
            }
        }

        self.state = LauncherState::Running;
        Ok(())
    }

    /// Block until shutdown is requested or the web server dies.
    /// A non-zero server exit while running is fatal, mirroring startup.
    pub async fn run(&mut self) -> LauncherResult<()> {
        let mut server = self.web_server.take();

        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    info!("shutdown requested");
                    self.shutdown().await;
                    return Ok(());
                }
                code = async {
                    match server.as_mut() {
                        Some(handle) => handle.exited().await,
                        None => std::future::pending().await,
                    }
                } => {
                    if code != 0 {
                        error!(code, "web server exited unexpectedly");
                        self.shutdown().await;
                        self.state = LauncherState::Failed;
                        return Err(LauncherError::ServerExited { code });
                    }
                    warn!("web server exited cleanly while running");
                    server = None;
                }
            }
        }
    }

    /// Signal both children for termination, best-effort. No wait for exit
    /// confirmation beyond what the process manager does internally.
    pub async fn shutdown(&mut self) {
        self.state = LauncherState::ShuttingDown;
        let _ = self.cancel_tx.send(true);

        if let Err(err) = self.process_manager.stop_all().await {
            warn!(%err, "error stopping child processes");
        }
        self.web_server = None;
        self.backend_pid = None;

        self.state = LauncherState::Terminated;
        info!("launcher terminated");
    }
}
