//! OPML feed-list parsing.
//!
//! The feed list is a standard OPML document: each top-level `<outline>`
//! under `<body>` is a category, and every nested `<outline>` carrying an
//! `xmlUrl` attribute is a feed in that category. Feeds without a usable
//! URL are skipped with a warning — a sloppy feed list should cost the bad
//! entries, not the run.

use crate::models::{Category, FeedSource};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::error::Error;
use tracing::{info, warn};
use url::Url;

/// Read and parse the OPML file at `path`.
///
/// # Errors
///
/// Fails when the file cannot be read or is not well-formed XML; an
/// unusable feed list is a startup error, not something to degrade over.
pub async fn load_feed_list(path: &str) -> Result<Vec<Category>, Box<dyn Error>> {
    let raw = tokio::fs::read_to_string(path).await?;
    let categories = parse_opml(&raw)?;
    info!(
        path = %path,
        categories = categories.len(),
        feeds = categories.iter().map(|c| c.feeds.len()).sum::<usize>(),
        "Loaded feed list"
    );
    Ok(categories)
}

/// Parse an OPML document into categories of feeds.
pub fn parse_opml(xml: &str) -> Result<Vec<Category>, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);

    let mut categories: Vec<Category> = Vec::new();
    let mut current: Option<Category> = None;
    let mut in_body = false;
    let mut outline_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"body" => in_body = true,
            Event::End(e) if e.name().as_ref() == b"body" => in_body = false,
            Event::Start(e) if in_body && e.name().as_ref() == b"outline" => {
                handle_outline(&e, outline_depth, &mut current)?;
                outline_depth += 1;
            }
            Event::Empty(e) if in_body && e.name().as_ref() == b"outline" => {
                handle_outline(&e, outline_depth, &mut current)?;
                // A self-closing top-level outline is a category with no feeds.
                if outline_depth == 0 {
                    if let Some(category) = current.take() {
                        categories.push(category);
                    }
                }
            }
            Event::End(e) if in_body && e.name().as_ref() == b"outline" => {
                outline_depth = outline_depth.saturating_sub(1);
                if outline_depth == 0 {
                    if let Some(category) = current.take() {
                        categories.push(category);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(categories)
}

fn handle_outline(
    e: &BytesStart<'_>,
    depth: usize,
    current: &mut Option<Category>,
) -> Result<(), Box<dyn Error>> {
    let name = attr(e, b"text")?.or(attr(e, b"title")?);
    let xml_url = attr(e, b"xmlUrl")?;

    if depth == 0 {
        if xml_url.is_some() {
            // A feed outside any category has no report to land in.
            warn!(feed = name.as_deref().unwrap_or("?"), "Skipping uncategorized feed");
            *current = None;
        } else {
            *current = Some(Category {
                name: name.unwrap_or_else(|| "Catégorie".to_string()),
                feeds: Vec::new(),
            });
        }
        return Ok(());
    }

    let Some(category) = current.as_mut() else {
        return Ok(());
    };
    let Some(url) = xml_url else {
        warn!(
            category = %category.name,
            feed = name.as_deref().unwrap_or("?"),
            "Feed entry without xmlUrl skipped"
        );
        return Ok(());
    };
    if Url::parse(&url).is_err() {
        warn!(category = %category.name, url = %url, "Feed entry with invalid URL skipped");
        return Ok(());
    }

    category.feeds.push(FeedSource {
        name: name.unwrap_or_else(|| url.clone()),
        url,
    });
    Ok(())
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, Box<dyn Error>> {
    match e.try_get_attribute(key)? {
        Some(a) => Ok(Some(a.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}
