//! Real process management for the launcher's two children
//!
//! Spawns the bundled web server and the optimization backend with
//! tokio::process, pipes their output into tracing line by line, and watches
//! for exits. The web server gets a pinned environment (fixed port, literal
//! IPv4 hostname) because `localhost` resolves to `::1` on some systems while
//! the server only listens on IPv4.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::LauncherConfig;
use crate::error::{LauncherError, LauncherResult};
use crate::traits::{ProcessManager, WebServerHandle};

/// How often exit watchers poll their child.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(500);

type ChildSlot = Arc<Mutex<Option<Child>>>;

/// Owns the web-server and backend children. At most one of each; stopping
/// is a kill of whatever is currently in the slot.
pub struct RealProcessManager {
    web_server: ChildSlot,
    backend: ChildSlot,
}

impl RealProcessManager {
    pub fn new() -> Self {
        Self {
            web_server: Arc::new(Mutex::new(None)),
            backend: Arc::new(Mutex::new(None)),
        }
    }

    /// Forward a child's stdout into the log, flagging known fatal patterns.
    /// Log-only: control flow reacts to the exit code, not to output text.
    fn pump_stdout(name: &'static str, stdout: ChildStdout) {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("{name} stdout: {line}");
            }
        });
    }

    fn pump_stderr(name: &'static str, stderr: ChildStderr) {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.contains("EADDRINUSE") {
                    error!("{name}: listen port is already in use");
                } else if line.contains("ECONNREFUSED") {
                    error!("{name}: connection refused, server may not be starting properly");
                }
                warn!("{name} stderr: {line}");
            }
        });
    }

    /// Poll the slot until the child exits or is taken away by `stop_all`.
    /// Reports the exit code on `exit_tx` when one exists.
    fn watch_exit(name: &'static str, slot: ChildSlot, exit_tx: Option<mpsc::Sender<i32>>) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(EXIT_POLL_INTERVAL).await;

                let mut guard = slot.lock().await;
                let child = match guard.as_mut() {
                    Some(child) => child,
                    // Slot emptied by stop_all; nothing left to watch.
                    None => break,
                };

                match child.try_wait() {
                    Ok(None) => {}
                    Ok(Some(status)) => {
                        let code = status.code().unwrap_or(-1);
                        if code == 0 {
                            info!("{name} exited with code 0");
                        } else {
                            error!("{name} exited with code {code}");
                        }
                        *guard = None;
                        drop(guard);
                        if let Some(tx) = exit_tx {
                            let _ = tx.send(code).await;
                        }
                        break;
                    }
                    Err(err) => {
                        warn!(%err, "could not poll {name} status");
                        break;
                    }
                }
            }
        });
    }

    async fn stop_slot(name: &'static str, slot: &ChildSlot) {
        let mut guard = slot.lock().await;
        if let Some(mut child) = guard.take() {
            if let Err(err) = child.kill().await {
                warn!(%err, "failed to kill {name}");
            } else {
                debug!("{name} stopped");
            }
        }
    }
}

impl Default for RealProcessManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessManager for RealProcessManager {
    async fn spawn_web_server(&self, config: &LauncherConfig) -> LauncherResult<WebServerHandle> {
        // Missing artifacts mean a broken package, not a runtime hiccup;
        // bail before any spawn attempt.
        if !config.server_entry.exists() {
            return Err(LauncherError::MissingArtifact {
                path: config.server_entry.clone(),
            });
        }
        if !config.server_assets.exists() {
            return Err(LauncherError::MissingArtifact {
                path: config.server_assets.clone(),
            });
        }

        let work_dir = config
            .server_entry
            .parent()
            .unwrap_or_else(|| Path::new("."));

        let mut cmd = Command::new(&config.server_command);
        cmd.arg(&config.server_entry)
            .current_dir(work_dir)
            .env("PORT", config.server_port.to_string())
            .env("HOSTNAME", "127.0.0.1")
            .env("NODE_OPTIONS", "--dns-result-order=ipv4first")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| LauncherError::SpawnFailed {
            process: "web server",
            source,
        })?;
        let pid = child.id().unwrap_or(0);

        if let Some(stdout) = child.stdout.take() {
            Self::pump_stdout("web server", stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            Self::pump_stderr("web server", stderr);
        }

        {
            let mut guard = self.web_server.lock().await;
            *guard = Some(child);
        }

        let (exit_tx, exit_rx) = mpsc::channel(1);
        Self::watch_exit("web server", Arc::clone(&self.web_server), Some(exit_tx));

        Ok(WebServerHandle::new(pid, exit_rx))
    }

    async fn spawn_backend(&self, config: &LauncherConfig) -> LauncherResult<u32> {
        let executable = &config.backend_executable;
        if !executable.exists() {
            return Err(LauncherError::MissingArtifact {
                path: executable.clone(),
            });
        }

        let work_dir = executable.parent().unwrap_or_else(|| Path::new("."));

        // Inherited environment, no shell wrapping, cwd pinned to the
        // executable's own directory so it finds its bundled data files.
        let mut cmd = Command::new(executable);
        cmd.current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| LauncherError::SpawnFailed {
            process: "backend",
            source,
        })?;
        let pid = child.id().unwrap_or(0);

        if let Some(stdout) = child.stdout.take() {
            Self::pump_stdout("backend", stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            Self::pump_stderr("backend", stderr);
        }

        {
            let mut guard = self.backend.lock().await;
            *guard = Some(child);
        }

        // Exit watching for diagnostics only; a dead backend never takes
        // the UI down with it.
        Self::watch_exit("backend", Arc::clone(&self.backend), None);

        Ok(pid)
    }

    async fn stop_all(&self) -> LauncherResult<()> {
        Self::stop_slot("web server", &self.web_server).await;
        Self::stop_slot("backend", &self.backend).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config_in(dir: &Path) -> LauncherConfig {
        LauncherConfig::new(dir.join("server.js"), dir.join("fastapi_server"))
            .with_server_assets(dir.join(".next"))
    }

    #[tokio::test]
    async fn missing_entry_point_refuses_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let manager = RealProcessManager::new();

        let err = manager
            .spawn_web_server(&config_in(dir.path()))
            .await
            .unwrap_err();

        match err {
            LauncherError::MissingArtifact { path } => {
                assert_eq!(path, dir.path().join("server.js"));
            }
            other => panic!("expected MissingArtifact, got {other:?}"),
        }
        assert!(manager.web_server.lock().await.is_none());
    }

    #[tokio::test]
    async fn missing_asset_dir_refuses_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("server.js"), "// entry").unwrap();

        let manager = RealProcessManager::new();
        let err = manager
            .spawn_web_server(&config_in(dir.path()))
            .await
            .unwrap_err();

        match err {
            LauncherError::MissingArtifact { path } => {
                assert_eq!(path, dir.path().join(".next"));
            }
            other => panic!("expected MissingArtifact, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_backend_executable_is_reported() {
        let manager = RealProcessManager::new();
        let config = LauncherConfig::new(
            PathBuf::from("server.js"),
            PathBuf::from("/nonexistent/fastapi_server"),
        );

        let err = manager.spawn_backend(&config).await.unwrap_err();
        assert!(matches!(err, LauncherError::MissingArtifact { .. }));
    }

    #[tokio::test]
    async fn stop_all_with_no_children_is_a_noop() {
        let manager = RealProcessManager::new();
        manager.stop_all().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn web_server_exit_is_reported_on_the_handle() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("server.js"), "exit 3\n").unwrap();
        std::fs::create_dir(dir.path().join(".next")).unwrap();

        // `sh server.js` exits 3 immediately; the watcher must surface it.
        let config = config_in(dir.path()).with_server_command("sh");
        let manager = RealProcessManager::new();
        let mut handle = manager.spawn_web_server(&config).await.unwrap();

        let code = tokio::time::timeout(Duration::from_secs(5), handle.exited())
            .await
            .expect("exit should be reported");
        assert_eq!(code, 3);
        assert!(manager.web_server.lock().await.is_none());
    }
}
