//! Tracing setup for the launcher binary

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the stdout tracing subscriber with the given base level.
/// Noisy HTTP internals are clamped to warn regardless of the base level.
pub fn init_tracing(log_level: &str) {
    let filter = format!("dcub_launcher={log_level},reqwest=warn,hyper=warn");

    fmt()
        .with_env_filter(EnvFilter::new(&filter))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
