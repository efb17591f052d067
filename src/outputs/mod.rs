//! Report rendering for JSON and Markdown.
//!
//! # Submodules
//!
//! - [`json`]: Writes a [`crate::models::CategoryReport`] to a JSON file
//! - [`markdown`]: Converts a report to a Markdown press-review document
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── international/
//!     └── international_20240315_10h30.json
//!
//! markdown_output_dir/
//! └── international/
//!     └── international_20240315_10h30.md
//! ```

pub mod json;
pub mod markdown;
