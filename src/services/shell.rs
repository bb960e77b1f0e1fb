//! Window shell backed by the system browser
//!
//! The desktop build embeds the UI in a webview; this launcher hands the
//! ready URL to the platform opener instead, which keeps the orchestration
//! identical while staying toolkit-free. Failure to open a window is logged
//! and swallowed: the server is up and the URL is printed either way.

use async_trait::async_trait;
use tracing::{info, warn};
use url::Url;

use crate::error::LauncherResult;
use crate::traits::WindowShell;

pub struct BrowserShell {
    headless: bool,
}

impl BrowserShell {
    pub fn new() -> Self {
        Self { headless: false }
    }

    /// Log the URL instead of opening anything (CI, servers).
    pub fn headless() -> Self {
        Self { headless: true }
    }

    fn opener() -> (&'static str, Vec<&'static str>) {
        if cfg!(target_os = "macos") {
            ("open", vec![])
        } else if cfg!(windows) {
            ("cmd", vec!["/C", "start", ""])
        } else {
            ("xdg-open", vec![])
        }
    }
}

impl Default for BrowserShell {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WindowShell for BrowserShell {
    async fn show_window(&self, url: &Url) -> LauncherResult<()> {
        info!(%url, "application ready");
        if self.headless {
            return Ok(());
        }

        let (program, args) = Self::opener();
        match tokio::process::Command::new(program)
            .args(args)
            .arg(url.as_str())
            .spawn()
        {
            Ok(_) => {}
            Err(err) => warn!(%err, "could not open a browser window, open {url} manually"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn headless_shell_never_fails() {
        let shell = BrowserShell::headless();
        let url = Url::parse("http://127.0.0.1:3000").unwrap();
        shell.show_window(&url).await.unwrap();
    }
}
