//! Command-line interface definitions for revue-presse.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Options that touch the environment (cache location) can also be provided
//! via environment variables.

use clap::Parser;

/// Command-line arguments for the revue-presse pipeline.
///
/// # Examples
///
/// ```sh
/// # Basic usage: one OPML feed list, reports under ./reports and ./json
/// revue-presse feeds.opml -m ./reports -j ./json
///
/// # With an explicit run configuration
/// revue-presse feeds.opml -m ./reports -j ./json -c config.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the OPML feed list (categories of feeds)
    pub opml_file: String,

    /// Output directory for the Markdown reports
    #[arg(short, long)]
    pub markdown_output_dir: String,

    /// Output directory for the JSON report files
    #[arg(short, long)]
    pub json_output_dir: String,

    /// Optional path to a config.yaml overriding the run defaults
    #[arg(short, long)]
    pub config: Option<String>,

    /// Translation cache file location (overrides the config value)
    #[arg(long, env = "REVUE_PRESSE_CACHE")]
    pub cache_file: Option<String>,
}
