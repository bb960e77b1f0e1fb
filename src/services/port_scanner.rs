//! Port occupancy via lsof and SIGKILL
//!
//! Discovery shells out to `lsof -ti:<port>`, which prints one pid per line
//! and exits non-zero when nothing matches. Termination is a straight SIGKILL:
//! the fixed port is treated as application-owned, and anything holding it is
//! assumed to be a stale instance. That assumption is unchecked, so a shared
//! machine can lose an unrelated process here.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{LauncherError, LauncherResult};
use crate::traits::PortScanner;

pub struct RealPortScanner;

impl RealPortScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealPortScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PortScanner for RealPortScanner {
    async fn pids_on_port(&self, port: u16) -> LauncherResult<Vec<u32>> {
        let output = Command::new("lsof")
            .arg("-ti")
            .arg(format!(":{port}"))
            .output()
            .await
            .map_err(|err| LauncherError::port_scan(format!("failed to run lsof: {err}")))?;

        // lsof exits 1 on an empty result; only the pid list matters.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let pids: Vec<u32> = stdout
            .lines()
            .filter_map(|line| line.trim().parse().ok())
            .collect();

        debug!(port, count = pids.len(), "scanned port occupancy");
        Ok(pids)
    }

    #[cfg(unix)]
    async fn kill(&self, pid: u32) -> LauncherResult<()> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        kill(Pid::from_raw(pid as i32), Signal::SIGKILL)
            .map_err(|err| LauncherError::port_scan(format!("kill {pid} failed: {err}")))
    }

    #[cfg(not(unix))]
    async fn kill(&self, pid: u32) -> LauncherResult<()> {
        let status = Command::new("taskkill")
            .args(["/PID", &pid.to_string(), "/F"])
            .status()
            .await
            .map_err(|err| LauncherError::port_scan(format!("taskkill {pid} failed: {err}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(LauncherError::port_scan(format!(
                "taskkill {pid} exited with {status}"
            )))
        }
    }
}
