//! Launcher-specific error types

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Required build artifact missing: {path}")]
    MissingArtifact { path: PathBuf },

    #[error("Failed to spawn {process}: {source}")]
    SpawnFailed {
        process: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Web server exited with status {code} before shutdown")]
    ServerExited { code: i32 },

    #[error("Server at {url} did not become ready within {timeout:?} ({attempts} attempts)")]
    ReadyTimeout {
        url: String,
        timeout: Duration,
        attempts: u32,
    },

    #[error("Startup cancelled by shutdown request")]
    Cancelled,

    #[error("Port scan failed: {message}")]
    PortScan { message: String },

    #[error("Probe failed: {message}")]
    Probe { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LauncherError {
    pub fn config(message: impl Into<String>) -> Self {
        LauncherError::Config {
            message: message.into(),
        }
    }

    pub fn port_scan(message: impl Into<String>) -> Self {
        LauncherError::PortScan {
            message: message.into(),
        }
    }

    pub fn probe(message: impl Into<String>) -> Self {
        LauncherError::Probe {
            message: message.into(),
        }
    }

    /// Fatal errors abort startup and map to a non-zero process exit.
    /// Everything else is logged and survived.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LauncherError::MissingArtifact { .. }
                | LauncherError::SpawnFailed { .. }
                | LauncherError::ServerExited { .. }
                | LauncherError::ReadyTimeout { .. }
        )
    }
}

pub type LauncherResult<T> = Result<T, LauncherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        let missing = LauncherError::MissingArtifact {
            path: PathBuf::from("/tmp/server.js"),
        };
        assert!(missing.is_fatal());

        let timeout = LauncherError::ReadyTimeout {
            url: "http://127.0.0.1:3000".into(),
            timeout: Duration::from_secs(15),
            attempts: 15,
        };
        assert!(timeout.is_fatal());

        assert!(!LauncherError::port_scan("lsof not found").is_fatal());
        assert!(!LauncherError::Cancelled.is_fatal());
    }

    #[test]
    fn ready_timeout_display_includes_attempts() {
        let err = LauncherError::ReadyTimeout {
            url: "http://127.0.0.1:3000".into(),
            timeout: Duration::from_secs(15),
            attempts: 14,
        };
        let msg = err.to_string();
        assert!(msg.contains("127.0.0.1:3000"));
        assert!(msg.contains("14 attempts"));
    }
}
