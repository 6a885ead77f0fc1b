//! HTTP client for the hosted hybrid CQM service.
//!
//! [`HybridClient`] speaks the service's problems API: upload the serialized
//! model, submit a job against the uploaded data, poll for a terminal
//! status, and fetch or cancel the answer. [`HybridSampler`] wraps the
//! client in the [`CqmSampler`] seam so callers never see HTTP.
//!
//! # Architecture
//!
//! The [`CqmSampler`] trait is synchronous to keep the core library
//! embeddable in synchronous contexts. This client bridges the async HTTP
//! calls to the sync interface by blocking on a Tokio runtime internally.

use std::time::{Duration, Instant};

use log::debug;
use ramble_core::{CqmSampler, ModeVar, SampleError, SamplerParams};
use ramble_cqm::{ConstrainedQuadraticModel, SampleSet};
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use crate::api::{AnswerResponse, JobStatus, ProblemResponse, SubmitRequest, UploadResponse};
use crate::tracker::JobTracker;

/// Errors raised while constructing a [`HybridClient`].
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Errors raised by [`HybridClient`] requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HybridError {
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// URL of the timed-out request.
        url: String,
        /// Configured timeout, in whole seconds.
        timeout_secs: u64,
    },
    /// The service answered with an error status code.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    Http {
        /// URL of the failed request.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail from the client.
        message: String,
    },
    /// The request never reached the service.
    #[error("network error for {url}: {message}")]
    Network {
        /// URL of the failed request.
        url: String,
        /// Error detail from the client.
        message: String,
    },
    /// A response body could not be decoded.
    #[error("failed to parse service response: {message}")]
    Parse {
        /// Decoder detail.
        message: String,
    },
    /// The service reported a job failure.
    #[error("hybrid service reported failure: {message}")]
    Service {
        /// Failure detail from the status poll.
        message: String,
    },
}

/// Default user agent for hybrid service requests.
pub const DEFAULT_USER_AGENT: &str = "ramble-hybrid/0.1";

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default pause between status polls in seconds.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

/// Configuration for [`HybridClient`].
#[derive(Debug, Clone)]
pub struct HybridClientConfig {
    /// Base URL for the hybrid service (e.g., `"https://cloud.example.com/v1"`).
    pub base_url: String,
    /// Per-request timeout duration.
    pub timeout: Duration,
    /// Pause between consecutive status polls.
    pub poll_interval: Duration,
    /// Overall deadline for polling; `None` polls until a terminal status.
    pub poll_deadline: Option<Duration>,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HybridClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            poll_deadline: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HybridClientConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the pause between status polls.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set an overall polling deadline.
    #[must_use]
    pub fn with_poll_deadline(mut self, poll_deadline: Duration) -> Self {
        self.poll_deadline = Some(poll_deadline);
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Synchronous client for the hybrid service's problems API.
///
/// The client owns a Tokio runtime that is reused across calls, avoiding
/// the overhead of creating a new runtime per request.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the client uses its own
/// stored runtime. When called from within an existing multi-threaded Tokio
/// runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]), it uses that runtime's handle with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics.
///
/// When called from within a `current_thread` Tokio runtime, the client
/// falls back to its own internal runtime. This avoids the panic that
/// `block_in_place` would cause, but may deadlock if the caller's runtime
/// is driving IO or timers this request depends on.
pub struct HybridClient {
    client: Client,
    config: HybridClientConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for HybridClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridClient")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl HybridClient {
    /// Create a new client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(HybridClientConfig::new(base_url))
    }

    /// Create a new client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HybridClientConfig) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ClientBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &HybridClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Upload a serialized model, returning the service's data handle.
    ///
    /// # Errors
    /// Returns a [`HybridError`] when the request fails or the response
    /// cannot be decoded.
    pub fn upload_model(
        &self,
        model: &ConstrainedQuadraticModel<ModeVar>,
    ) -> Result<String, HybridError> {
        self.block_on(self.upload_async(model))
    }

    /// Start a job against uploaded data, returning the problem id and its
    /// initial status.
    ///
    /// # Errors
    /// Returns a [`HybridError`] when the request fails or the response
    /// cannot be decoded.
    pub fn submit(
        &self,
        data_id: &str,
        params: &SamplerParams,
    ) -> Result<(String, JobStatus), HybridError> {
        let response = self.block_on(self.submit_async(data_id, params))?;
        Ok((response.id, response.status))
    }

    /// The current status of a submitted problem.
    ///
    /// # Errors
    /// Returns a [`HybridError`] when the request fails or the response
    /// cannot be decoded.
    pub fn status(&self, problem_id: &str) -> Result<JobStatus, HybridError> {
        Ok(self.block_on(self.status_async(problem_id))?.status)
    }

    /// Fetch a completed problem's answer.
    ///
    /// # Errors
    /// Returns a [`HybridError`] when the request fails or the response
    /// cannot be decoded.
    pub fn answer(&self, problem_id: &str) -> Result<SampleSet<ModeVar>, HybridError> {
        self.block_on(self.answer_async(problem_id))
    }

    /// Request cancellation of a problem.
    ///
    /// Cancellation is best-effort: the service may complete the job anyway.
    ///
    /// # Errors
    /// Returns a [`HybridError`] when the request fails.
    pub fn cancel(&self, problem_id: &str) -> Result<(), HybridError> {
        self.block_on(self.cancel_async(problem_id))
    }

    /// Upload a serialized model, returning the data handle.
    async fn upload_async(
        &self,
        model: &ConstrainedQuadraticModel<ModeVar>,
    ) -> Result<String, HybridError> {
        let url = self.endpoint("problems/data");
        let response = self
            .client
            .post(&url)
            .json(model)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let upload: UploadResponse = response.json().await.map_err(|err| HybridError::Parse {
            message: err.to_string(),
        })?;
        Ok(upload.data_id)
    }

    /// Start a job against previously uploaded data.
    async fn submit_async(
        &self,
        data_id: &str,
        params: &SamplerParams,
    ) -> Result<ProblemResponse, HybridError> {
        let url = self.endpoint("problems");
        let body = SubmitRequest {
            data_id,
            label: &params.label,
            time_limit: params.time_limit.as_secs_f64(),
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        response.json().await.map_err(|err| HybridError::Parse {
            message: err.to_string(),
        })
    }

    /// Poll a job's current status.
    async fn status_async(&self, problem_id: &str) -> Result<ProblemResponse, HybridError> {
        let url = self.endpoint(&format!("problems/{problem_id}"));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        response.json().await.map_err(|err| HybridError::Parse {
            message: err.to_string(),
        })
    }

    /// Fetch a completed job's answer.
    async fn answer_async(&self, problem_id: &str) -> Result<SampleSet<ModeVar>, HybridError> {
        let url = self.endpoint(&format!("problems/{problem_id}/answer"));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let answer: AnswerResponse = response.json().await.map_err(|err| HybridError::Parse {
            message: err.to_string(),
        })?;
        Ok(answer.answer)
    }

    /// Request cancellation of a job.
    ///
    /// Cancellation is best-effort: the service may complete the job anyway.
    async fn cancel_async(&self, problem_id: &str) -> Result<(), HybridError> {
        let url = self.endpoint(&format!("problems/{problem_id}"));
        self.client
            .delete(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        Ok(())
    }

    /// Drive a submission to a terminal status and return the answer.
    async fn run_job_async(
        &self,
        model: &ConstrainedQuadraticModel<ModeVar>,
        params: &SamplerParams,
    ) -> Result<SampleSet<ModeVar>, SampleError> {
        let mut tracker = JobTracker::new(params.label.clone());

        let data_id = self
            .upload_async(model)
            .await
            .map_err(HybridError::into_sample_error)?;
        tracker.record_upload(data_id.clone());
        debug!("uploaded model as {data_id}");

        let submitted = self
            .submit_async(&data_id, params)
            .await
            .map_err(HybridError::into_sample_error)?;
        tracker
            .record_submission(submitted.id.clone())
            .map_err(|err| SampleError::Backend {
                message: err.to_string(),
            })?;
        debug!(
            "submitted problem {} with status {}",
            submitted.id, submitted.status
        );

        let started = Instant::now();
        let mut latest = submitted;
        while !latest.status.is_terminal() {
            if let Some(deadline) = self.config.poll_deadline {
                if started.elapsed() >= deadline {
                    debug!("deadline reached, requesting cancellation of {}", latest.id);
                    // Best-effort: the job may still run to completion.
                    if let Err(err) = self.cancel_async(&latest.id).await {
                        debug!("cancellation of {} failed: {err}", latest.id);
                    }
                    return Err(SampleError::DeadlineExceeded);
                }
            }
            tokio::time::sleep(self.config.poll_interval).await;
            latest = self
                .status_async(&latest.id)
                .await
                .map_err(HybridError::into_sample_error)?;
            tracker
                .update_status(latest.status)
                .map_err(|err| SampleError::Backend {
                    message: err.to_string(),
                })?;
        }

        match latest.status {
            JobStatus::Completed => self
                .answer_async(&latest.id)
                .await
                .map_err(HybridError::into_sample_error),
            JobStatus::Cancelled => Err(SampleError::Cancelled),
            JobStatus::Failed => Err(SampleError::Backend {
                message: latest.message.unwrap_or_else(|| "job failed".to_string()),
            }),
            _ => Err(SampleError::Backend {
                message: format!("poll loop exited on non-terminal status {}", latest.status),
            }),
        }
    }

    /// Convert a reqwest error to a [`HybridError`].
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> HybridError {
        if error.is_timeout() {
            return HybridError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return HybridError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        HybridError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    /// Block on a future using the appropriate runtime.
    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        // block_in_place requires a multi-threaded runtime; for
        // current_thread runtimes we fall back to our own stored runtime.
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

impl HybridError {
    /// Collapse a transport failure into the sampler seam's error type.
    fn into_sample_error(self) -> SampleError {
        match self {
            Self::Parse { message } => SampleError::Rejected {
                reason: format!("unreadable service response: {message}"),
            },
            Self::Service { message } => SampleError::Backend { message },
            other => SampleError::Backend {
                message: other.to_string(),
            },
        }
    }
}

/// Remote sampler backed by the hybrid service.
///
/// Implements [`CqmSampler`] by uploading the model, submitting a job,
/// polling until the job reaches a terminal status, and decoding the
/// answer. Failures surface as [`SampleError`] variants; an exhausted
/// polling deadline triggers a best-effort cancellation first.
#[derive(Debug)]
pub struct HybridSampler {
    client: HybridClient,
}

impl HybridSampler {
    /// Create a sampler against the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Ok(Self {
            client: HybridClient::new(base_url)?,
        })
    }

    /// Create a sampler with explicit client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HybridClientConfig) -> Result<Self, ClientBuildError> {
        Ok(Self {
            client: HybridClient::with_config(config)?,
        })
    }

    /// The underlying client's configuration.
    #[must_use]
    pub const fn config(&self) -> &HybridClientConfig {
        self.client.config()
    }
}

impl CqmSampler for HybridSampler {
    fn sample(
        &self,
        model: &ConstrainedQuadraticModel<ModeVar>,
        params: &SamplerParams,
    ) -> Result<SampleSet<ModeVar>, SampleError> {
        self.client.block_on(self.client.run_job_async(model, params))
    }
}
