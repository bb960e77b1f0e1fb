//! Port reaping before the web server is launched
//!
//! A stale server from a previous run (or anything else) squatting on the
//! fixed port would make the fresh spawn die with EADDRINUSE, so every
//! occupant is killed first. This is deliberately indiscriminate: the port is
//! treated as owned by the application, and whatever holds it is fair game.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::LauncherResult;
use crate::traits::PortScanner;

/// Clears a TCP port by killing every process listening on it.
pub struct PortReaper {
    grace: Duration,
}

impl PortReaper {
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }

    /// Kill everything on `port`, then wait the grace delay so the OS can
    /// release the socket. Resolves immediately when the port is free.
    /// Returns the number of termination requests issued.
    pub async fn reap<S: PortScanner + ?Sized>(
        &self,
        scanner: &S,
        port: u16,
    ) -> LauncherResult<usize> {
        let pids = scanner.pids_on_port(port).await?;
        if pids.is_empty() {
            debug!(port, "port is free, nothing to reap");
            return Ok(0);
        }

        warn!(port, ?pids, "killing stale processes on port");
        for pid in &pids {
            if let Err(err) = scanner.kill(*pid).await {
                // Racing against the process exiting by itself is fine.
                warn!(pid, %err, "could not kill process");
            }
        }

        tokio::time::sleep(self.grace).await;
        Ok(pids.len())
    }
}
