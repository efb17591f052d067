//! The per-item pipeline and the per-category batch orchestrator.
//!
//! One item flows through extract → translate (title, body) → condense →
//! translate (summary re-check) → localize date. Every step is total or
//! resolves to an explicit [`ItemOutcome::Dropped`]; nothing an item does
//! can abort its siblings or the category.
//!
//! A category fans its items out over a bounded worker pool, each task
//! wrapped in a timeout. Results are collected in completion order and
//! sorted by localized date, most recent first, before rendering.

use crate::config::RunConfig;
use crate::extract::Extractor;
use crate::feeds::FeedReader;
use crate::models::{Category, FeedItem, ProcessedArticle};
use crate::summarize::Summarizer;
use crate::translate::Translator;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// Body text at or below this length is carried as-is: too short to be
/// worth a translation call of its own.
const MIN_BODY_TRANSLATE_CHARS: usize = 100;

/// Summaries longer than this get their language re-checked; the model
/// sometimes answers in the source language despite translated input.
const MIN_SUMMARY_RECHECK_CHARS: usize = 50;

/// Why an item produced no article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Neither extraction nor the feed summary produced any text.
    EmptyContent,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::EmptyContent => write!(f, "empty content"),
        }
    }
}

/// The result of running one item through the pipeline.
#[derive(Debug)]
pub enum ItemOutcome {
    Processed(ProcessedArticle),
    Dropped { link: String, reason: DropReason },
}

/// Owns the per-item steps and the per-category fan-out.
pub struct Pipeline {
    reader: FeedReader,
    extractor: Extractor,
    translator: Translator,
    summarizer: Summarizer,
    max_workers: usize,
    task_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        reader: FeedReader,
        extractor: Extractor,
        translator: Translator,
        summarizer: Summarizer,
        config: &RunConfig,
    ) -> Self {
        Self {
            reader,
            extractor,
            translator,
            summarizer,
            max_workers: config.max_workers,
            task_timeout: Duration::from_secs(config.task_timeout_secs),
        }
    }

    /// Run one item through the pipeline.
    pub async fn process_item(&self, item: FeedItem) -> ItemOutcome {
        debug!(link = %item.link, "Processing item");

        let body = self.extractor.extract(&item.link, &item.summary_raw).await;
        if body.trim().is_empty() {
            return ItemOutcome::Dropped {
                link: item.link,
                reason: DropReason::EmptyContent,
            };
        }

        let title = self.translator.translate(&item.title).await;
        let body = if body.chars().count() > MIN_BODY_TRANSLATE_CHARS {
            self.translator.translate(&body).await
        } else {
            body
        };

        let mut summary = self.summarizer.summarize(&body).await;
        if summary.chars().count() > MIN_SUMMARY_RECHECK_CHARS
            && !self.translator.is_target_lang(&summary)
        {
            summary = self.translator.translate(&summary).await;
        }

        let date = self.translator.localize_date(&item.published_raw);

        ItemOutcome::Processed(ProcessedArticle {
            title,
            date,
            source: item.source_name,
            summary,
            link: item.link,
        })
    }

    /// Read every feed of `category` and process its items on the worker
    /// pool. Returns the surviving articles sorted by localized date,
    /// most recent first.
    #[instrument(level = "info", skip_all, fields(category = %category.name))]
    pub async fn run_category(&self, category: &Category) -> Vec<ProcessedArticle> {
        // Feed reads are cheap and sequential; items are where the work is.
        let mut items = Vec::new();
        for feed in &category.feeds {
            items.extend(self.reader.read_feed(feed).await);
        }
        let items: Vec<FeedItem> = items.into_iter().unique_by(|i| i.link.clone()).collect();
        let scheduled = items.len();
        info!(feeds = category.feeds.len(), items = scheduled, "Category items scheduled");

        let results: Vec<Option<ProcessedArticle>> = stream::iter(items)
            .map(|item| {
                let link = item.link.clone();
                async move {
                    match timeout(self.task_timeout, self.process_item(item)).await {
                        Ok(ItemOutcome::Processed(article)) => Some(article),
                        Ok(ItemOutcome::Dropped { link, reason }) => {
                            warn!(%link, %reason, "Item dropped");
                            None
                        }
                        Err(_) => {
                            warn!(
                                %link,
                                timeout_secs = self.task_timeout.as_secs(),
                                "Item processing timed out"
                            );
                            None
                        }
                    }
                }
            })
            .buffer_unordered(self.max_workers)
            .collect()
            .await;

        let mut articles: Vec<ProcessedArticle> = results.into_iter().flatten().collect();
        articles.sort_by(|a, b| b.date.cmp(&a.date));

        info!(
            processed = articles.len(),
            dropped = scheduled - articles.len(),
            "Category complete"
        );
        articles
    }
}
