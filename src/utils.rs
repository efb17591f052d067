//! Utility functions for text cleanup, string manipulation, and file system
//! operations.
//!
//! This module provides helper functions used throughout the application:
//! - HTML tag stripping and whitespace normalization for model input
//! - String truncation and slugification for logging and file paths
//! - File system validation for output directories

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Boxed error type usable across `await` points in `Send` futures.
pub type BoxError = Box<dyn Error + Send + Sync>;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip HTML tags and collapse whitespace runs into single spaces.
///
/// Feed summaries and extracted bodies routinely carry markup fragments and
/// hard-wrapped whitespace; both the translation backends and the
/// summarization model want plain running text.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_text("<p>Hello   world</p>"), "Hello world");
/// ```
pub fn clean_text(text: &str) -> String {
    let without_tags = TAG_RE.replace_all(text, "");
    WS_RE.replace_all(&without_tags, " ").trim().to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Arguments
///
/// * `s` - The string to potentially truncate
/// * `max` - Maximum number of characters to keep
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max).collect();
        format!("{}…(+{} bytes)", kept, s.len() - kept.len())
    }
}

/// Convert a category name to a path-friendly slug.
///
/// Lowercases the text, removes special characters, and replaces spaces
/// with hyphens. Used for per-category output directories and filenames.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify("Économie & Finance"), "économie--finance");
/// ```
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .replace(' ', "-")
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_strips_tags() {
        assert_eq!(
            clean_text("<p>Hello <b>world</b></p>"),
            "Hello world"
        );
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(
            clean_text("Un  texte\n\tavec   des blancs"),
            "Un texte avec des blancs"
        );
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        // Character-based truncation must not split a multi-byte sequence.
        let s = "é".repeat(20);
        let result = truncate_for_log(&s, 10);
        assert!(result.starts_with(&"é".repeat(10)));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Science & Technologie"), "science--technologie");
        assert_eq!(slugify("Actualités"), "actualités");
    }
}
