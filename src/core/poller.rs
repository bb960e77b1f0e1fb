//! Readiness polling for the just-spawned web server
//!
//! The server is only considered up once it answers an HTTP GET. Each probe
//! carries its own short timeout, distinct from the overall deadline, so one
//! hung request cannot stall the loop. Probes are strictly sequential: a probe
//! is awaited (or aborted by its own timeout) before the next one starts, so a
//! late response can never double-resolve the outcome.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::LauncherConfig;
use crate::error::{LauncherError, LauncherResult};
use crate::traits::ServerProbe;

/// Outcome of a successful poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyReport {
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Polls a URL until it responds or the overall deadline elapses.
pub struct ReadinessPoller {
    timeout: Duration,
    probe_timeout: Duration,
    retry_interval: Duration,
}

impl ReadinessPoller {
    pub fn new(timeout: Duration, probe_timeout: Duration, retry_interval: Duration) -> Self {
        Self {
            timeout,
            probe_timeout,
            retry_interval,
        }
    }

    pub fn from_config(config: &LauncherConfig) -> Self {
        Self::new(
            config.ready_timeout,
            config.probe_timeout,
            config.retry_interval,
        )
    }

    /// Probe `url` until it answers. Connection errors and per-probe timeouts
    /// are retried on a fixed interval; exceeding the overall deadline fails
    /// with the attempt count. `cancel` interrupts the poll deterministically,
    /// including an in-flight probe.
    pub async fn wait_until_ready<P: ServerProbe + ?Sized>(
        &self,
        probe: &P,
        url: &Url,
        mut cancel: watch::Receiver<bool>,
    ) -> LauncherResult<ReadyReport> {
        let target = rewrite_loopback(url.clone());
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, url = %target, "probing server");

            let outcome = tokio::select! {
                res = probe.probe(&target, self.probe_timeout) => res,
                _ = cancel.changed() => return Err(LauncherError::Cancelled),
            };

            match outcome {
                Ok(()) => {
                    let elapsed = started.elapsed();
                    info!(attempts, ?elapsed, url = %target, "server is ready");
                    return Ok(ReadyReport { attempts, elapsed });
                }
                Err(err) => {
                    let elapsed = started.elapsed();
                    if elapsed > self.timeout {
                        warn!(
                            attempts,
                            ?elapsed,
                            "server did not become ready within {:?}",
                            self.timeout
                        );
                        return Err(LauncherError::ReadyTimeout {
                            url: target.to_string(),
                            timeout: self.timeout,
                            attempts,
                        });
                    }
                    debug!(attempt = attempts, %err, "probe failed, retrying");
                    tokio::select! {
                        _ = tokio::time::sleep(self.retry_interval) => {}
                        _ = cancel.changed() => return Err(LauncherError::Cancelled),
                    }
                }
            }
        }
    }
}

/// Substitute the symbolic loopback name with its literal IPv4 form.
/// `localhost` resolves to `::1` on some hosts while the server only
/// listens on IPv4.
pub fn rewrite_loopback(mut url: Url) -> Url {
    if url.host_str() == Some("localhost") {
        // set_host only fails on cannot-be-a-base URLs
        let _ = url.set_host(Some("127.0.0.1"));
    }
    url
}
