//! HTTP client for the optimization backend
//!
//! Jobs can run for minutes, so the request timeout is generous (300 s) and
//! enforced per request. Failures are kept distinct so the UI can tell the
//! user whether the job timed out, the backend is unreachable, or the backend
//! rejected the job.

use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::submit::types::{OptimizationJob, OptimizationResult, RunModulesRequest, RunModulesResponse};

/// Default request deadline for one optimization run.
pub const SUBMISSION_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Optimization request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unable to reach the optimization backend: {0}")]
    Network(String),

    #[error("Optimization failed with status {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Malformed response from backend: {0}")]
    Decode(String),
}

pub struct BackendClient {
    base: Url,
    client: reqwest::Client,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            client: reqwest::Client::new(),
            timeout: SUBMISSION_TIMEOUT,
        }
    }

    /// Configure request timeout (fluent API)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Submit one job to `POST /run-modules` and wait for the evaluation.
    pub async fn run_modules(
        &self,
        job: &OptimizationJob,
    ) -> Result<OptimizationResult, SubmissionError> {
        let url = self
            .base
            .join("run-modules")
            .map_err(|err| SubmissionError::Network(err.to_string()))?;
        debug!(%url, organisms = job.organisms.len(), "submitting optimization job");

        let request = RunModulesRequest {
            user_input_dict: job,
            should_run_output_module: true,
        };

        let response = self
            .client
            .post(url)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    SubmissionError::Timeout(self.timeout)
                } else {
                    SubmissionError::Network(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // FastAPI puts its error message under "detail".
            let detail = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("detail")
                        .and_then(|d| d.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                });
            return Err(SubmissionError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<RunModulesResponse>()
            .await
            .map(|body| body.result)
            .map_err(|err| SubmissionError::Decode(err.to_string()))
    }
}
