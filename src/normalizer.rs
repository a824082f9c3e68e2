//! Turns loosely structured feed entries into fully defaulted `Article`s.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::article::{
    Article, Domain, DEFAULT_LINK, DEFAULT_PUBLISHED, DEFAULT_SOURCE, DEFAULT_TITLE,
    MAX_SUMMARY_CHARS,
};
use crate::rss::{FeedSource, RawEntry};

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex"));
static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
// An opening bracket that never closes swallows the rest of the text.
static DANGLING_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*$").expect("valid regex"));
static NUMERIC_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#([xX][0-9a-fA-F]+|[0-9]+);").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&#39;", "'"),
    ("&ndash;", "\u{2013}"),
    ("&mdash;", "\u{2014}"),
    ("&lsquo;", "\u{2018}"),
    ("&rsquo;", "\u{2019}"),
    ("&ldquo;", "\u{201C}"),
    ("&rdquo;", "\u{201D}"),
    ("&hellip;", "\u{2026}"),
    // Must run last so "&amp;lt;" decodes to "&lt;" and not "<".
    ("&amp;", "&"),
];

/// Builds an `Article` from a raw entry. Missing fields degrade to defaults;
/// this never fails.
pub fn normalize(raw: &RawEntry, source: &FeedSource) -> Article {
    let source_name = non_blank(Some(source.name.as_str())).unwrap_or(DEFAULT_SOURCE);

    let summary_html = non_blank(raw.summary.as_deref())
        .or_else(|| non_blank(raw.description.as_deref()))
        .or_else(|| non_blank(raw.content.as_deref()))
        .unwrap_or_default();

    Article {
        title: non_blank(raw.title.as_deref())
            .map(collapse_whitespace)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        summary: truncate_chars(&strip_html(summary_html), MAX_SUMMARY_CHARS),
        link: non_blank(raw.link.as_deref())
            .unwrap_or(DEFAULT_LINK)
            .to_string(),
        source: source_name.to_string(),
        published: non_blank(raw.published.as_deref())
            .unwrap_or(DEFAULT_PUBLISHED)
            .to_string(),
        domain: Some(
            source
                .domain
                .unwrap_or_else(|| Domain::from_source_name(source_name)),
        ),
    }
}

/// Reduces markup to plain text: drops script and style blocks, removes tags,
/// then decodes entities and collapses whitespace. Text that decodes to `<` or
/// `>` is kept as text.
pub fn strip_html(html: &str) -> String {
    let without_blocks = SCRIPT_BLOCK.replace_all(html, " ");
    let without_blocks = STYLE_BLOCK.replace_all(&without_blocks, " ");
    let text = TAG.replace_all(&without_blocks, " ");
    let text = DANGLING_TAG.replace_all(&text, " ");
    collapse_whitespace(&decode_entities(&text))
}

/// Hard cutoff at `max` characters; not word-boundary aware.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn decode_entities(text: &str) -> String {
    let decoded = NUMERIC_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(|c| c.to_string())
            .unwrap_or_default()
    });

    NAMED_ENTITIES
        .iter()
        .fold(decoded.into_owned(), |acc, (entity, replacement)| {
            acc.replace(entity, replacement)
        })
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
