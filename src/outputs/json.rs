//! JSON report file generation.
//!
//! Serializes a [`CategoryReport`] under a per-category directory. The
//! artifact is the machine-readable twin of the Markdown report.

use crate::models::CategoryReport;
use crate::utils::slugify;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `report` to `{json_output_dir}/{slug}/{slug}_{stamp}.json`.
///
/// # Errors
///
/// Fails when the directory cannot be created or the file cannot be
/// written; the caller logs and moves on to the next category.
#[instrument(level = "info", skip_all, fields(category = %report.category))]
pub async fn write_report(
    report: &CategoryReport,
    json_output_dir: &str,
    stamp: &str,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    let slug = slugify(&report.category);
    let dir = format!("{}/{}", json_output_dir.trim_end_matches('/'), slug);
    if let Err(e) = fs::create_dir_all(&dir).await {
        error!(%dir, error = %e, "Failed to create JSON report dir");
        return Err(e.into());
    }

    let filename = format!("{dir}/{slug}_{stamp}.json");
    fs::write(&filename, json).await?;
    info!(path = %filename, articles = report.articles.len(), "Wrote JSON report");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessedArticle;

    #[tokio::test]
    async fn test_write_report_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let report = CategoryReport {
            category: "Science & Technologie".to_string(),
            generated_at: "15/03/2024 à 10:30".to_string(),
            articles: vec![ProcessedArticle {
                title: "Titre".to_string(),
                date: "15 mars 2024 à 09:00".to_string(),
                source: "Flux".to_string(),
                summary: "Résumé.".to_string(),
                link: "https://example.com/a".to_string(),
            }],
        };

        write_report(&report, dir.path().to_str().unwrap(), "20240315_10h30")
            .await
            .unwrap();

        let path = dir
            .path()
            .join("science--technologie")
            .join("science--technologie_20240315_10h30.json");
        let raw = std::fs::read_to_string(path).unwrap();
        let back: CategoryReport = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.category, "Science & Technologie");
        assert_eq!(back.articles.len(), 1);
    }
}
