//! Run configuration with YAML overrides.
//!
//! Every knob of the pipeline lives here with a conservative default; a
//! YAML file passed on the command line overrides individual fields. The
//! worker pool and retry defaults are deliberately small — the pipeline
//! talks to free public APIs and must stay well under their rate limits.

use serde::Deserialize;
use std::error::Error;
use tracing::info;

/// Pipeline-wide configuration.
///
/// All fields are optional in the YAML file; anything omitted keeps its
/// default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Items retained per feed.
    pub max_items_per_feed: usize,
    /// Worker pool size per category. Kept small to respect external rate limits.
    pub max_workers: usize,
    /// Timeout for a single outbound HTTP request, in seconds.
    pub request_timeout_secs: u64,
    /// Retries on transient HTTP failures during article extraction.
    pub retry_count: u32,
    /// Per-item processing timeout, in seconds.
    pub task_timeout_secs: u64,
    /// Translation cache file.
    pub cache_file: String,
    /// Characters of cleaned article text handed to the summarization model.
    pub max_content_length: usize,
    /// Minimum summary length requested from the model.
    pub min_summary_length: usize,
    /// Maximum summary length requested from the model; also bounds the
    /// degraded truncation fallback.
    pub max_summary_length: usize,
    /// ISO 639-1 code of the language reports are produced in.
    pub target_lang: String,
    /// Source language assumed when detection fails.
    pub default_source_lang: String,
    /// Summarization model endpoint.
    pub summarizer: SummarizerConfig,
}

/// Where the condenser sends its inference requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummarizerConfig {
    /// HTTP endpoint speaking the Hugging Face inference protocol.
    pub endpoint: String,
    /// Optional bearer token.
    pub api_token: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_items_per_feed: 3,
            max_workers: 3,
            request_timeout_secs: 10,
            retry_count: 2,
            task_timeout_secs: 30,
            cache_file: "translation_cache.json".to_string(),
            max_content_length: 1000,
            min_summary_length: 50,
            max_summary_length: 300,
            target_lang: "fr".to_string(),
            default_source_lang: "en".to_string(),
            summarizer: SummarizerConfig::default(),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models/facebook/bart-large-cnn"
                .to_string(),
            api_token: None,
        }
    }
}

impl RunConfig {
    /// Load the run configuration.
    ///
    /// With no path, returns the defaults. With a path, the file must exist
    /// and parse — a run with a half-applied configuration is worse than no
    /// run at all.
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        match path {
            None => Ok(Self::default()),
            Some(p) => {
                let raw = std::fs::read_to_string(p)?;
                let config: RunConfig = serde_yaml::from_str(&raw)?;
                info!(path = %p, "Loaded run configuration");
                Ok(config)
            }
        }
    }
}
