//! Summarization model API interaction with exponential backoff retry logic.
//!
//! This module provides the HTTP client for the external summarization
//! model, speaking the Hugging Face inference protocol, with automatic
//! retry and jittered exponential backoff to ride out transient failures.
//!
//! # Architecture
//!
//! The module uses a trait-based design for flexibility:
//! - [`CondenseAsync`]: Core trait defining async model interaction
//! - [`ModelEndpoint`]: The concrete HTTP-backed implementation
//! - [`RetryCondense`]: Decorator that adds retry logic to any
//!   `CondenseAsync` implementation
//!
//! # Retry Strategy
//!
//! - Maximum 5 retry attempts
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use crate::config::SummarizerConfig;
use crate::utils::BoxError;
use rand::{Rng, rng};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};
use url::Url;

/// Generation constraints sent with every inference request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationParams {
    pub min_length: usize,
    pub max_length: usize,
    pub num_beams: u32,
    pub no_repeat_ngram_size: u32,
    pub early_stopping: bool,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParams,
}

#[derive(Deserialize)]
struct InferenceResponse {
    summary_text: String,
}

/// Trait for async summarization model interaction.
///
/// Implementors can send text to the model and receive a condensed version.
/// This abstraction allows decorators (like retry logic) to wrap any
/// backend transparently.
pub trait CondenseAsync {
    /// Send text to the model and receive its condensed form.
    async fn condense(&self, text: &str) -> Result<String, BoxError>;
}

/// The summarization model endpoint.
///
/// Construction validates the configured endpoint URL; a pipeline that
/// cannot reach for its model should refuse to start rather than drop
/// every item at runtime.
pub struct ModelEndpoint {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
    params: GenerationParams,
}

impl ModelEndpoint {
    pub fn new(config: &SummarizerConfig, params: GenerationParams) -> Result<Self, BoxError> {
        Url::parse(&config.endpoint)?;
        let client = Client::builder()
            .timeout(StdDuration::from_secs(30))
            .user_agent(concat!("revue-presse/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_token: config.api_token.clone(),
            params,
        })
    }
}

impl fmt::Debug for ModelEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelEndpoint")
            .field("endpoint", &self.endpoint)
            .field("params", &self.params)
            .finish()
    }
}

impl CondenseAsync for ModelEndpoint {
    #[instrument(level = "info", skip_all)]
    async fn condense(&self, text: &str) -> Result<String, BoxError> {
        let t0 = Instant::now();
        let mut request = self.client.post(&self.endpoint).json(&InferenceRequest {
            inputs: text,
            parameters: &self.params,
        });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let dt = t0.elapsed();
        let status = response.status();
        if !status.is_success() {
            warn!(elapsed_ms = dt.as_millis() as u128, %status, "Model call failed");
            return Err(format!("model endpoint returned HTTP {status}").into());
        }

        let mut outputs: Vec<InferenceResponse> = response.json().await?;
        if outputs.is_empty() {
            return Err("model endpoint returned an empty result set".into());
        }
        Ok(outputs.remove(0).summary_text)
    }
}

/// Wrapper that adds exponential backoff retry logic to any
/// [`CondenseAsync`] implementation.
///
/// # Backoff Strategy
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryCondense<T> {
    /// The underlying model client to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryCondense<T>
where
    T: CondenseAsync,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryCondense<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryCondense")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> CondenseAsync for RetryCondense<T>
where
    T: CondenseAsync + fmt::Debug,
{
    #[instrument(level = "info", skip_all)]
    async fn condense(&self, text: &str) -> Result<String, BoxError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.condense(text).await {
                Ok(resp) => {
                    return Ok(resp);
                }
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                            elapsed_ms_total = total_dt.as_millis() as u128,
                            error = %e,
                            "condense() exhausted retries"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u128,
                        elapsed_ms_total = total_dt.as_millis() as u128,
                        ?delay,
                        error = %e,
                        "condense() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
