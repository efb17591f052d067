//! Translation backends tried in priority order by the resolver.
//!
//! Each backend wraps one free public translation API behind the same
//! narrow [`TranslateBackend`] capability: attempt a translation, return
//! `Ok(None)` when the service answered but produced nothing usable, and an
//! error when the call itself failed. The resolver treats both the same way
//! and moves on to the next backend.

use crate::utils::BoxError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

/// One fallible translation strategy in the ordered fallback chain.
#[async_trait]
pub trait TranslateBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Try to translate `text` from `source` to `target` (ISO 639-1 codes).
    ///
    /// `Ok(None)` means the service responded but had no usable
    /// translation; `Err` means the call itself failed. Both are absorbed
    /// by the resolver.
    async fn attempt(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Option<String>, BoxError>;
}

fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("revue-presse/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
}

fn cap_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// ---- MyMemory ----

/// The MyMemory bilingual-memory API. First in the chain: generous free
/// tier, but echoes its input back on silent failure, so echoes are
/// rejected here.
pub struct MyMemory {
    client: Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseStatus")]
    response_status: i64,
    #[serde(rename = "responseData")]
    response_data: MyMemoryData,
}

#[derive(Deserialize)]
struct MyMemoryData {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl MyMemory {
    pub fn new() -> Self {
        Self::with_endpoint("https://api.mymemory.translated.net/get")
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: http_client(Duration::from_secs(10)),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TranslateBackend for MyMemory {
    fn name(&self) -> &'static str {
        "mymemory"
    }

    async fn attempt(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Option<String>, BoxError> {
        let query = cap_chars(text, 500);
        let langpair = format!("{source}|{target}");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query.as_str()), ("langpair", langpair.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "MyMemory returned an error status");
            return Ok(None);
        }

        let body: MyMemoryResponse = response.json().await?;
        if body.response_status != 200 {
            debug!(status = body.response_status, "MyMemory refused the request");
            return Ok(None);
        }

        let translated = body.response_data.translated_text;
        // An "answer" identical to the question is the API's way of failing.
        if translated.to_lowercase() == query.to_lowercase() {
            debug!("MyMemory echoed its input");
            return Ok(None);
        }
        Ok(Some(translated))
    }
}

// ---- LibreTranslate ----

/// A LibreTranslate instance, second in the chain.
pub struct LibreTranslate {
    client: Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct LibreResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl LibreTranslate {
    pub fn new() -> Self {
        Self::with_endpoint("https://libretranslate.de/translate")
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: http_client(Duration::from_secs(15)),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TranslateBackend for LibreTranslate {
    fn name(&self) -> &'static str {
        "libretranslate"
    }

    async fn attempt(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Option<String>, BoxError> {
        let query = cap_chars(text, 1000);
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[
                ("q", query.as_str()),
                ("source", source),
                ("target", target),
                ("format", "text"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "LibreTranslate returned an error status");
            return Ok(None);
        }

        let body: LibreResponse = response.json().await?;
        Ok(Some(body.translated_text))
    }
}

// ---- Lingva ----

/// A Lingva Translate instance, last in the chain. Lingva proxies a larger
/// engine with its own auto-detection, so the resolver's source hint is
/// ignored in favor of `auto`.
///
/// The upstream engine rate-limits aggressively; consecutive calls through
/// this backend are spaced at least [`Self::min_spacing`] apart no matter
/// how many workers are asking.
pub struct Lingva {
    client: Client,
    endpoint: String,
    min_spacing: Duration,
    last_call: Mutex<Option<Instant>>,
}

#[derive(Deserialize)]
struct LingvaResponse {
    translation: String,
}

impl Lingva {
    pub fn new() -> Self {
        Self::with_endpoint("https://lingva.ml", Duration::from_secs(2))
    }

    pub fn with_endpoint(endpoint: impl Into<String>, min_spacing: Duration) -> Self {
        Self {
            client: http_client(Duration::from_secs(15)),
            endpoint: endpoint.into(),
            min_spacing,
            last_call: Mutex::new(None),
        }
    }

    // Holding the lock across the sleep serializes concurrent callers, so
    // the spacing holds pipeline-wide and not merely per task.
    async fn throttle(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_spacing {
                sleep(self.min_spacing - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}

#[async_trait]
impl TranslateBackend for Lingva {
    fn name(&self) -> &'static str {
        "lingva"
    }

    async fn attempt(
        &self,
        text: &str,
        _source: &str,
        target: &str,
    ) -> Result<Option<String>, BoxError> {
        self.throttle().await;

        let query = cap_chars(text, 1000);
        let url = format!(
            "{}/api/v1/auto/{}/{}",
            self.endpoint.trim_end_matches('/'),
            target,
            urlencoding::encode(&query)
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Lingva returned an error status");
            return Ok(None);
        }

        let body: LingvaResponse = response.json().await?;
        Ok(Some(body.translation))
    }
}
