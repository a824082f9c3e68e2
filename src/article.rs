//! The normalized article record shared by every stage of the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_TITLE: &str = "No title";
pub const DEFAULT_LINK: &str = "#";
pub const DEFAULT_SOURCE: &str = "Unknown source";
pub const DEFAULT_PUBLISHED: &str = "Unknown";

/// Maximum number of characters kept from an entry summary.
pub const MAX_SUMMARY_CHARS: usize = 300;

/// Source-name fragments that mark a feed as research rather than news.
const RESEARCH_MARKERS: &[&str] = &["arxiv", "paper", "research", "journal"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Research,
    News,
}

impl Domain {
    /// Derives a coarse category from the configured source name.
    pub fn from_source_name(source: &str) -> Domain {
        let lower = source.to_lowercase();
        if RESEARCH_MARKERS.iter().any(|marker| lower.contains(marker)) {
            Domain::Research
        } else {
            Domain::News
        }
    }

    pub fn parse(value: &str) -> Option<Domain> {
        match value.trim().to_lowercase().as_str() {
            "research" => Some(Domain::Research),
            "news" => Some(Domain::News),
            _ => None,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Research => write!(f, "AI Research"),
            Domain::News => write!(f, "AI News"),
        }
    }
}

/// A news item after normalization. `title`, `link` and `source` are never
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub source: String,
    pub published: String,
    pub domain: Option<Domain>,
}
