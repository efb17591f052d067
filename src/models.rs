//! Data models for feed items and their processed representations.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`FeedSource`] / [`Category`]: the feed list as declared in the OPML input
//! - [`FeedItem`]: one feed entry awaiting processing
//! - [`ProcessedArticle`]: a fully translated and summarized article
//! - [`CategoryReport`]: the per-category aggregate handed to the renderers

use serde::{Deserialize, Serialize};

/// One feed as declared in the OPML input.
///
/// The URL is the feed's identity; the name is the display label from the
/// OPML `text` attribute and is only used when the feed itself carries no
/// title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    /// Display name from the feed list.
    pub name: String,
    /// The feed URL. Identity of the source.
    pub url: String,
}

/// A named group of feeds producing one report per run.
#[derive(Debug, Clone)]
pub struct Category {
    /// Category name from the feed list, also used for the output paths.
    pub name: String,
    /// The feeds aggregated into this category's report.
    pub feeds: Vec<FeedSource>,
}

/// One feed entry to be processed into a [`ProcessedArticle`] or dropped.
///
/// Fields are kept raw: the date stays in whatever form the feed published
/// it (localization happens at the end of the item pipeline), and the
/// summary is the feed-provided text used as an extraction fallback.
#[derive(Debug, Clone)]
pub struct FeedItem {
    /// Entry title, untranslated.
    pub title: String,
    /// Entry link. Stable identity used for logging and de-duplication.
    pub link: String,
    /// Publication date as published by the feed, possibly empty.
    pub published_raw: String,
    /// Title of the feed (or the configured feed name) this entry came from.
    pub source_name: String,
    /// Feed-provided summary, possibly empty. Extraction fallback.
    pub summary_raw: String,
}

/// A fully processed article: translated title, localized date, bounded
/// summary. Immutable once created; items that fail a non-recoverable step
/// never become one.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessedArticle {
    /// Translated title.
    pub title: String,
    /// Localized publication date, e.g. `15 mars 2024 à 10:30`.
    pub date: String,
    /// Name of the feed the article came from.
    pub source: String,
    /// Translated, condensed article body.
    pub summary: String,
    /// Link to the original article.
    pub link: String,
}

/// The per-category aggregate serialized to JSON and rendered to Markdown.
#[derive(Debug, Deserialize, Serialize)]
pub struct CategoryReport {
    /// Category name from the feed list.
    pub category: String,
    /// Generation timestamp in `DD/MM/YYYY à HH:MM` format.
    pub generated_at: String,
    /// Articles sorted by localized date, most recent first.
    pub articles: Vec<ProcessedArticle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processed_article_serialization() {
        let article = ProcessedArticle {
            title: "Un titre".to_string(),
            date: "15 mars 2024 à 10:30".to_string(),
            source: "Le Monde".to_string(),
            summary: "Un résumé.".to_string(),
            link: "https://example.com/article".to_string(),
        };

        let json = serde_json::to_string(&article).unwrap();
        assert!(json.contains("15 mars 2024"));
        let back: ProcessedArticle = serde_json::from_str(&json).unwrap();
        assert_eq!(back.title, "Un titre");
        assert_eq!(back.link, "https://example.com/article");
    }

    #[test]
    fn test_category_report_deserialization() {
        let json = r#"{
            "category": "International",
            "generated_at": "15/03/2024 à 18:00",
            "articles": []
        }"#;

        let report: CategoryReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.category, "International");
        assert_eq!(report.articles.len(), 0);
    }
}
