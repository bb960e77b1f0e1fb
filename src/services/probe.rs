//! HTTP readiness probe backed by reqwest

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{LauncherError, LauncherResult};
use crate::traits::ServerProbe;

/// One GET per call with a per-request timeout. Any response, including an
/// error status, proves the server is accepting connections.
pub struct RealServerProbe {
    client: reqwest::Client,
}

impl RealServerProbe {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for RealServerProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServerProbe for RealServerProbe {
    async fn probe(&self, url: &Url, timeout: Duration) -> LauncherResult<()> {
        self.client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| LauncherError::probe(err.to_string()))
    }
}
