//! Feed parsing logic for RSS, Atom, and JSON formats.

use anyhow::{anyhow, Context, Result};
use feed_rs::model::Entry;
use feed_rs::parser;
use std::io::Cursor;
use tracing::debug;

use super::types::{JsonFeed, JsonFeedItem, RawEntry};
use super::util::{body_preview, cleanup_xml};
use crate::TARGET_WEB_REQUEST;

/// Parse a feed body into raw entries, choosing JSON Feed or XML based on the
/// content type and the body itself.
pub fn parse_feed(body: &str, content_type: Option<&str>) -> Result<Vec<RawEntry>> {
    let looks_like_json = content_type.is_some_and(|ct| ct.contains("json"))
        || body.trim_start().starts_with('{');

    if looks_like_json {
        debug!(target: TARGET_WEB_REQUEST, "Parsing body as JSON feed");
        let feed: JsonFeed =
            serde_json::from_str(body).context("Failed to parse JSON feed")?;
        return Ok(feed.items.into_iter().map(entry_from_json).collect());
    }

    match parser::parse(Cursor::new(body.as_bytes())) {
        Ok(feed) => Ok(feed.entries.into_iter().map(entry_from_xml).collect()),
        Err(first_err) => {
            let cleaned = cleanup_xml(body);
            if !(cleaned.contains("<rss") || cleaned.contains("<feed")) {
                return Err(anyhow!(
                    "Content is not an RSS or Atom feed. Content preview: {}",
                    body_preview(body)
                ));
            }

            debug!(target: TARGET_WEB_REQUEST, "Retrying feed parse after XML cleanup: {}", first_err);
            let feed = parser::parse(Cursor::new(cleaned.as_bytes())).map_err(|second_err| {
                anyhow!(
                    "Failed to parse feed even after cleanup. First error: {}. Second error: {}",
                    first_err,
                    second_err
                )
            })?;
            Ok(feed.entries.into_iter().map(entry_from_xml).collect())
        }
    }
}

fn entry_from_xml(entry: Entry) -> RawEntry {
    let link = entry_link(&entry);
    RawEntry {
        title: entry.title.map(|t| t.content),
        summary: entry.summary.map(|t| t.content),
        description: None,
        content: entry.content.and_then(|c| c.body),
        link,
        published: entry.published.or(entry.updated).map(|d| d.to_rfc2822()),
    }
}

/// The entry's web page: the alternate link, else the first link listed.
/// Atom feeds (Blogger in particular) often list replies, edit and self links
/// before it.
fn entry_link(entry: &Entry) -> Option<String> {
    entry
        .links
        .iter()
        .find(|link| {
            link.rel
                .as_deref()
                .map_or(true, |rel| rel.eq_ignore_ascii_case("alternate"))
        })
        .or_else(|| entry.links.first())
        .map(|link| link.href.clone())
}

fn entry_from_json(item: JsonFeedItem) -> RawEntry {
    RawEntry {
        title: item.title,
        summary: item.summary,
        description: item.content_text,
        content: item.content_html,
        link: item.url.or(item.id),
        published: item.date_published,
    }
}
