//! Full-text article extraction.
//!
//! Given an article URL and the feed-provided summary as a fallback, fetch
//! the page with a bounded retry policy and harvest its readable text.
//! Anything that goes wrong — transient HTTP failures that outlive the
//! retries, unparseable markup, pages with no prose — resolves to the
//! fallback text. The caller never sees an error.

use crate::config::RunConfig;
use crate::utils::BoxError;
use rand::{Rng, rng};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Extracted text shorter than this is treated as a failed extraction.
const MIN_CONTENT_CHARS: usize = 100;

/// HTTP statuses worth retrying.
const TRANSIENT_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

pub struct Extractor {
    client: Client,
    retry_count: u32,
}

impl Extractor {
    pub fn new(config: &RunConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("revue-presse/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            retry_count: config.retry_count,
        }
    }

    /// Retrieve the article body at `url`, or `fallback` when extraction
    /// comes up short. Never raises.
    pub async fn extract(&self, url: &str, fallback: &str) -> String {
        match self.download(url).await {
            Ok(body) => {
                let content = harvest_text(&body);
                if content.chars().count() > MIN_CONTENT_CHARS {
                    content
                } else {
                    info!(%url, "Insufficient extracted content, using feed summary");
                    fallback.to_string()
                }
            }
            Err(e) => {
                warn!(%url, error = %e, "Article download failed, using feed summary");
                fallback.to_string()
            }
        }
    }

    async fn download(&self, url: &str) -> Result<String, BoxError> {
        let mut delay = Duration::from_secs(1);

        for attempt in 0..=self.retry_count {
            let outcome = match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response.text().await?);
                    }
                    if TRANSIENT_STATUSES.contains(&status.as_u16()) {
                        format!("transient HTTP {status}")
                    } else {
                        return Err(format!("HTTP {status}").into());
                    }
                }
                Err(e) => e.to_string(),
            };

            if attempt == self.retry_count {
                return Err(
                    format!("{} after {} attempts", outcome, self.retry_count + 1).into(),
                );
            }

            let jitter = Duration::from_millis(rng().random_range(0..=250));
            warn!(%url, attempt = attempt + 1, error = %outcome, ?delay, "Retrying download");
            sleep(delay + jitter).await;
            delay *= 2;
        }

        unreachable!("loop returns on the final attempt")
    }
}

/// Harvest readable text from an HTML document.
///
/// Prefers paragraphs inside `<article>`, then `<main>`, then anywhere in
/// the document, keeping the richest harvest.
fn harvest_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut best = String::new();

    for scope in ["article p", "main p", "p"] {
        let selector = Selector::parse(scope).unwrap();
        let mut content = String::new();
        for element in document.select(&selector) {
            let text = element.text().collect::<Vec<_>>().join(" ");
            let text = text.trim();
            if !text.is_empty() {
                content.push_str(text);
                content.push('\n');
            }
        }
        if content.chars().count() > best.chars().count() {
            best = content;
        }
        if best.chars().count() > MIN_CONTENT_CHARS {
            break;
        }
    }

    best.trim().to_string()
}
