//! # Revue Presse
//!
//! A press-review pipeline that reads an OPML feed list, fetches and
//! extracts each article's full text, translates it into the target
//! language through a chain of free translation APIs, condenses it with an
//! external summarization model, and writes one Markdown and one JSON
//! report per category.
//!
//! ## Usage
//!
//! ```sh
//! revue-presse feeds.opml -m ./reports -j ./json
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Feed list**: Parse the OPML document into categories of feeds
//! 2. **Reading**: Collect the most recent items of each feed
//! 3. **Processing**: Extract, translate, and summarize items (parallel,
//!    bounded worker pool per category, per-item timeout)
//! 4. **Output**: Write JSON artifacts and Markdown reports per category
//!
//! Categories run sequentially; items within a category run concurrently.
//! A failed feed, article, or backend only ever costs its own unit — the
//! run always produces a (possibly empty) report set.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cache;
mod cli;
mod config;
mod extract;
mod feeds;
mod models;
mod opml;
mod outputs;
mod pipeline;
mod summarize;
mod translate;
mod utils;

use cache::TranslationCache;
use cli::Cli;
use config::RunConfig;
use extract::Extractor;
use feeds::FeedReader;
use models::CategoryReport;
use pipeline::Pipeline;
use summarize::Summarizer;
use translate::Translator;
use utils::{ensure_writable_dir, slugify};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("revue-presse starting up");

    let args = Cli::parse();
    debug!(?args.opml_file, ?args.markdown_output_dir, ?args.json_output_dir, "Parsed CLI arguments");

    let mut config = RunConfig::load(args.config.as_deref())?;
    if let Some(cache_file) = args.cache_file {
        config.cache_file = cache_file;
    }

    // Early check: both output dirs must be writable before any network work
    for dir in [&args.markdown_output_dir, &args.json_output_dir] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let categories = opml::load_feed_list(&args.opml_file).await?;

    // The summarizer is the one fatal construction: without a model there
    // is nothing worth running.
    let summarizer = Summarizer::new(&config)?;

    let cache = Arc::new(TranslationCache::load(&config.cache_file));
    let translator = Translator::new(&config, cache.clone());
    let pipeline = Pipeline::new(
        FeedReader::new(&config),
        Extractor::new(&config),
        translator,
        summarizer,
        &config,
    );

    let stamp = Local::now().format("%Y%m%d_%Hh%M").to_string();
    let mut total_articles = 0usize;
    let mut reports_written = 0usize;

    for category in &categories {
        let articles = pipeline.run_category(category).await;
        if articles.is_empty() {
            warn!(category = %category.name, "No articles survived processing, skipping report");
            continue;
        }
        total_articles += articles.len();

        let report = CategoryReport {
            category: category.name.clone(),
            generated_at: Local::now().format("%d/%m/%Y à %H:%M").to_string(),
            articles,
        };

        if let Err(e) = outputs::json::write_report(&report, &args.json_output_dir, &stamp).await {
            error!(category = %category.name, error = %e, "Failed to write JSON report");
        }

        let md = outputs::markdown::report_to_markdown(&report);
        let slug = slugify(&report.category);
        let md_dir = format!("{}/{}", args.markdown_output_dir.trim_end_matches('/'), slug);
        let md_path = format!("{md_dir}/{slug}_{stamp}.md");
        if let Err(e) = tokio::fs::create_dir_all(&md_dir).await {
            error!(path = %md_dir, error = %e, "Failed to create Markdown report dir");
        } else if let Err(e) = tokio::fs::write(&md_path, md).await {
            error!(path = %md_path, error = %e, "Failed to write Markdown report");
        } else {
            info!(path = %md_path, articles = report.articles.len(), "Wrote Markdown report");
            reports_written += 1;
        }
    }

    cache.close();

    let elapsed = start_time.elapsed();
    info!(
        categories = categories.len(),
        reports = reports_written,
        articles = total_articles,
        cache_entries = cache.len(),
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
