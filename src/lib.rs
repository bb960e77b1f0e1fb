//! Launcher for the DCUB codon-optimization desktop suite
//!
//! The optimization algorithm lives in a separate backend process behind an
//! HTTP API; the UI is served by a bundled web server. This crate owns what
//! sits between them: clearing the fixed port, spawning both children,
//! polling the server until it answers, showing the window, and tearing
//! everything down on exit. It also carries the thin client layer the
//! launcher ships with: input validation, the `/run-modules` submission
//! client, and the persisted form snapshot.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod services;
pub mod submit;
pub mod traits;

// Re-export commonly used types
pub use config::LauncherConfig;
pub use crate::core::{PortReaper, ReadinessPoller, ReadyReport};
pub use error::{LauncherError, LauncherResult};
pub use orchestrator::{AppOrchestrator, LauncherState};
pub use traits::{PortScanner, ProcessManager, ServerProbe, WebServerHandle, WindowShell};
