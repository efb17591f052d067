//! Feed reading: one feed source in, a bounded list of items out.
//!
//! A feed that cannot be fetched or parsed yields an empty list and an
//! error log — one dead source must never cost the category its report.
//! Individual entries missing a link are skipped with a warning.

use crate::config::RunConfig;
use crate::models::{FeedItem, FeedSource};
use crate::utils::BoxError;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info, warn};

pub struct FeedReader {
    client: Client,
    max_items: usize,
}

impl FeedReader {
    pub fn new(config: &RunConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("revue-presse/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            max_items: config.max_items_per_feed,
        }
    }

    /// Read `source` into at most `max_items` items. Never raises: fetch or
    /// parse failures are logged and yield an empty list.
    pub async fn read_feed(&self, source: &FeedSource) -> Vec<FeedItem> {
        let body = match self.download(&source.url).await {
            Ok(body) => body,
            Err(e) => {
                error!(feed = %source.url, error = %e, "Failed to fetch feed");
                return Vec::new();
            }
        };

        let parsed = match feed_rs::parser::parse(body.as_bytes()) {
            Ok(feed) => feed,
            Err(e) => {
                error!(feed = %source.url, error = %e, "Failed to parse feed");
                return Vec::new();
            }
        };

        let feed_title = parsed.title.map(|t| t.content);
        let source_name = feed_title.unwrap_or_else(|| source.name.clone());

        let mut items = Vec::new();
        for entry in parsed.entries.into_iter().take(self.max_items) {
            let Some(link) = entry.links.first().map(|l| l.href.clone()) else {
                warn!(feed = %source.url, entry = %entry.id, "Entry without link skipped");
                continue;
            };
            let title = entry
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| "Sans titre".to_string());
            let published_raw = entry
                .published
                .or(entry.updated)
                .map(|dt| dt.to_rfc2822())
                .unwrap_or_default();
            let summary_raw = entry.summary.map(|s| s.content).unwrap_or_default();

            items.push(FeedItem {
                title,
                link,
                published_raw,
                source_name: source_name.clone(),
                summary_raw,
            });
        }

        info!(feed = %source.url, count = items.len(), "Collected feed items");
        items
    }

    async fn download(&self, url: &str) -> Result<String, BoxError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}").into());
        }
        Ok(response.text().await?)
    }
}
