//! Launcher configuration
//!
//! One parameterized configuration replaces the two divergent Electron main
//! processes the product used to ship. All ports, timeouts and artifact
//! locations live here so tests can instantiate independent launchers.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{LauncherError, LauncherResult};

/// Fixed HTTP port the bundled web server listens on.
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Port the optimization backend binds; we spawn it but never probe it.
pub const DEFAULT_BACKEND_PORT: u16 = 8000;

/// Everything the orchestrator needs to bring the application up.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Port the web server child is forced onto via `PORT`.
    pub server_port: u16,

    /// Program used to run the server entry point (the bundled runtime).
    pub server_command: String,

    /// Pre-built server entry point, e.g. `.next/standalone/server.js`.
    pub server_entry: PathBuf,

    /// Asset directory that must ship next to the entry point.
    pub server_assets: PathBuf,

    /// Platform-specific backend executable.
    pub backend_executable: PathBuf,

    /// Overall readiness deadline.
    pub ready_timeout: Duration,

    /// Per-probe request timeout, distinct from the overall deadline.
    pub probe_timeout: Duration,

    /// Backoff between failed probes.
    pub retry_interval: Duration,

    /// Grace delay after killing stale port occupants.
    pub reap_grace: Duration,
}

impl LauncherConfig {
    pub fn new(server_entry: PathBuf, backend_executable: PathBuf) -> Self {
        let server_assets = server_entry
            .parent()
            .map(|dir| dir.join(".next"))
            .unwrap_or_else(|| PathBuf::from(".next"));

        Self {
            server_port: DEFAULT_SERVER_PORT,
            server_command: "node".to_string(),
            server_entry,
            server_assets,
            backend_executable,
            ready_timeout: Duration::from_secs(15),
            probe_timeout: Duration::from_secs(2),
            retry_interval: Duration::from_secs(1),
            reap_grace: Duration::from_secs(1),
        }
    }

    /// Configure server port (fluent API)
    pub fn with_server_port(mut self, port: u16) -> Self {
        self.server_port = port;
        self
    }

    /// Configure the runtime command used for the server entry point (fluent API)
    pub fn with_server_command(mut self, command: impl Into<String>) -> Self {
        self.server_command = command.into();
        self
    }

    /// Configure the asset directory checked before spawn (fluent API)
    pub fn with_server_assets(mut self, assets: PathBuf) -> Self {
        self.server_assets = assets;
        self
    }

    /// Configure readiness deadline (fluent API)
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Configure per-probe timeout (fluent API)
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Configure retry backoff (fluent API)
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Configure reap grace delay (fluent API)
    pub fn with_reap_grace(mut self, grace: Duration) -> Self {
        self.reap_grace = grace;
        self
    }

    /// URL the window loads once the server answers. Always the literal IPv4
    /// loopback; `localhost` resolves to `::1` on some hosts while the server
    /// only listens on IPv4.
    pub fn server_url(&self) -> LauncherResult<Url> {
        Url::parse(&format!("http://127.0.0.1:{}", self.server_port)).map_err(LauncherError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_product_contract() {
        let config = LauncherConfig::new(
            PathBuf::from("/app/standalone/server.js"),
            PathBuf::from("/app/backend/fastapi_server"),
        );

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.ready_timeout, Duration::from_secs(15));
        assert_eq!(config.probe_timeout, Duration::from_secs(2));
        assert_eq!(config.retry_interval, Duration::from_secs(1));
        assert_eq!(config.reap_grace, Duration::from_secs(1));
        assert_eq!(
            config.server_assets,
            PathBuf::from("/app/standalone/.next")
        );
    }

    #[test]
    fn server_url_uses_literal_loopback() {
        let config = LauncherConfig::new(PathBuf::from("server.js"), PathBuf::from("backend"))
            .with_server_port(4010);
        let url = config.server_url().unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:4010/");
    }
}
