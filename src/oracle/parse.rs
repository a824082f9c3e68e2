//! Parsing of the oracle's free-text answers. Prompt-format knowledge stays in
//! this module and `crate::prompt`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::prompt::{LINK_LABEL, RELEVANCE_LABEL, SOURCE_LABEL, TITLE_LABEL};

static LEADING_NO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\W*no\b").expect("valid regex"));
static NEGATED_RELEVANCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\bnot|n't)\s+(?:\w+\s+)?relevant\b|\birrelevant\b").expect("valid regex")
});

/// One selection emitted by the oracle, in the order it was emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedPick {
    pub title: String,
    pub source: String,
    pub relevance: String,
    pub link: String,
}

/// Interprets a yes/no answer. An answer counts as relevant when it contains
/// "yes" or "relevant". With `negation_aware`, answers that open with "no" or
/// negate relevance ("not relevant", "irrelevant") are rejected first.
pub fn parse_verdict(response: &str, negation_aware: bool) -> bool {
    let answer = response.trim().to_lowercase();

    if negation_aware && (LEADING_NO.is_match(&answer) || NEGATED_RELEVANCE.is_match(&answer)) {
        return false;
    }

    answer.contains("yes") || answer.contains("relevant")
}

#[derive(Default)]
struct PickDraft {
    title: Option<String>,
    source: Option<String>,
    relevance: Option<String>,
    link: Option<String>,
}

impl PickDraft {
    fn into_pick(self) -> Option<RankedPick> {
        let title = self.title.filter(|t| !t.is_empty())?;
        let link = self.link.filter(|l| !l.is_empty())?;
        Some(RankedPick {
            title,
            source: self.source.unwrap_or_default(),
            relevance: self.relevance.unwrap_or_default(),
            link,
        })
    }
}

/// Splits a selection answer into blocks on separator lines and keeps the
/// blocks that carry both a title and a link. A second TITLE line inside one
/// block also starts a new block.
pub fn parse_selection_blocks(response: &str) -> Vec<RankedPick> {
    let mut picks = Vec::new();
    let mut draft = PickDraft::default();

    for line in response.lines() {
        if is_separator(line) {
            picks.extend(std::mem::take(&mut draft).into_pick());
            continue;
        }

        if let Some(title) = labeled_value(line, TITLE_LABEL) {
            if draft.title.is_some() {
                picks.extend(std::mem::take(&mut draft).into_pick());
            }
            draft.title = Some(title);
        } else if let Some(source) = labeled_value(line, SOURCE_LABEL) {
            draft.source = Some(source);
        } else if let Some(relevance) = labeled_value(line, RELEVANCE_LABEL) {
            draft.relevance = Some(relevance);
        } else if let Some(link) = labeled_value(line, LINK_LABEL) {
            draft.link = Some(link.trim_matches(['<', '>']).to_string());
        }
    }
    picks.extend(draft.into_pick());

    picks
}

fn is_separator(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

/// Value of `line` when it starts with `label`, ignoring case, list markers
/// and markdown emphasis around the label.
fn labeled_value(line: &str, label: &str) -> Option<String> {
    let line = line.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '#' | '-' | '_'));
    let head = line.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    Some(
        line[label.len()..]
            .trim()
            .trim_matches(['*', '_'])
            .trim()
            .to_string(),
    )
}
