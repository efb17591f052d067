//! Article condenser.
//!
//! Bridges the pipeline to the external summarization model while keeping
//! its own promises independent of the model's health: short inputs pass
//! through untouched, and any model failure degrades to a hard truncation
//! of the cleaned input. The pipeline never stalls on model errors.

use crate::api::{CondenseAsync, GenerationParams, ModelEndpoint, RetryCondense};
use crate::config::RunConfig;
use crate::utils::clean_text;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info};

/// Inputs below this length are not worth condensing.
const MIN_CONDENSE_CHARS: usize = 100;

/// Condenses normalized article text into a bounded synopsis.
pub struct Summarizer {
    model: RetryCondense<ModelEndpoint>,
    max_content_length: usize,
    max_summary_length: usize,
}

impl Summarizer {
    /// Build the condenser from the run configuration.
    ///
    /// This is the pipeline's one fatal startup step: an unusable model
    /// endpoint aborts the run before any feed is touched.
    pub fn new(config: &RunConfig) -> Result<Self, Box<dyn Error>> {
        let params = GenerationParams {
            min_length: config.min_summary_length,
            max_length: config.max_summary_length,
            num_beams: 4,
            no_repeat_ngram_size: 3,
            early_stopping: true,
        };
        let endpoint =
            ModelEndpoint::new(&config.summarizer, params).map_err(|e| -> Box<dyn Error> { e })?;
        info!(endpoint = %config.summarizer.endpoint, "Summarization model ready");

        Ok(Self {
            model: RetryCondense::new(endpoint, 5, Duration::from_secs(1)),
            max_content_length: config.max_content_length,
            max_summary_length: config.max_summary_length,
        })
    }

    #[cfg(test)]
    fn with_model(
        model: RetryCondense<ModelEndpoint>,
        max_content_length: usize,
        max_summary_length: usize,
    ) -> Self {
        Self {
            model,
            max_content_length,
            max_summary_length,
        }
    }

    /// Condense `text` into a synopsis. Total: model failures degrade to a
    /// truncation of the cleaned input, never an error.
    pub async fn summarize(&self, text: &str) -> String {
        if text.chars().count() < MIN_CONDENSE_CHARS {
            return text.to_string();
        }

        let cleaned: String = clean_text(text)
            .chars()
            .take(self.max_content_length)
            .collect();

        match self.model.condense(&cleaned).await {
            Ok(summary) => {
                let summary = clean_text(&summary);
                if summary.is_empty() {
                    debug!("Model produced an empty summary, falling back to truncation");
                    truncate_with_ellipsis(&cleaned, self.max_summary_length)
                } else {
                    summary
                }
            }
            Err(e) => {
                error!(error = %e, "Summarization failed, falling back to truncation");
                truncate_with_ellipsis(&cleaned, self.max_summary_length)
            }
        }
    }
}

fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    let mut out: String = text.chars().take(max).collect();
    out.push('…');
    out
}
