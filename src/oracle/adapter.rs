use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::parse::{parse_selection_blocks, parse_verdict, RankedPick};
use super::TextOracle;
use crate::article::Article;
use crate::error::OracleError;
use crate::persona::Persona;
use crate::prompt::{relevance_prompt, selection_prompt, MAX_SELECTION_CANDIDATES};
use crate::TARGET_LLM_REQUEST;

pub const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SELECT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct AdapterSettings {
    pub classify_timeout: Duration,
    pub select_timeout: Duration,
    /// Reject answers such as "not relevant" before the substring rule runs.
    pub negation_aware: bool,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        AdapterSettings {
            classify_timeout: DEFAULT_CLASSIFY_TIMEOUT,
            select_timeout: DEFAULT_SELECT_TIMEOUT,
            negation_aware: true,
        }
    }
}

/// Outcome of one binary relevance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Relevant,
    NotRelevant,
    /// The oracle failed; treated as not relevant.
    Unavailable,
}

impl Verdict {
    pub fn is_relevant(self) -> bool {
        self == Verdict::Relevant
    }
}

/// Outcome of a batch selection: the oracle's ranked picks, or the leading
/// input articles when the oracle could not be used.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Ranked(Vec<RankedPick>),
    Fallback(Vec<Article>),
}

impl Selection {
    pub fn len(&self) -> usize {
        match self {
            Selection::Ranked(picks) => picks.len(),
            Selection::Fallback(articles) => articles.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Selection::Fallback(_))
    }
}

/// Wraps a `TextOracle` behind the two relevance operations. Neither
/// operation fails: oracle errors become `Verdict::Unavailable` or
/// `Selection::Fallback`.
pub struct RelevanceAdapter {
    oracle: Arc<dyn TextOracle>,
    settings: AdapterSettings,
}

impl RelevanceAdapter {
    pub fn new(oracle: Arc<dyn TextOracle>, settings: AdapterSettings) -> Self {
        RelevanceAdapter { oracle, settings }
    }

    pub fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    pub async fn is_relevant(&self, title: &str, summary: &str, persona: &Persona) -> bool {
        self.classify(title, summary, persona).await.is_relevant()
    }

    pub async fn classify(&self, title: &str, summary: &str, persona: &Persona) -> Verdict {
        let prompt = relevance_prompt(title, summary, persona);

        match self.ask(&prompt, self.settings.classify_timeout).await {
            Ok(response) => {
                let relevant = parse_verdict(&response, self.settings.negation_aware);
                debug!(target: TARGET_LLM_REQUEST, "Classified {:?} for {}: {} ({:?})", title, persona.name, relevant, response.trim());
                if relevant {
                    Verdict::Relevant
                } else {
                    Verdict::NotRelevant
                }
            }
            Err(err) => {
                warn!(target: TARGET_LLM_REQUEST, "Error classifying {:?} with {}: {}", title, self.oracle.name(), err);
                Verdict::Unavailable
            }
        }
    }

    /// Asks the oracle for the `count` most relevant of (at most
    /// `MAX_SELECTION_CANDIDATES`) `articles`, in its order. Falls back to the
    /// first `count` articles when the oracle fails or nothing parses.
    pub async fn select_top(&self, articles: &[Article], persona: &Persona, count: usize) -> Selection {
        if count == 0 || articles.is_empty() {
            return Selection::Fallback(Vec::new());
        }

        let candidates = &articles[..articles.len().min(MAX_SELECTION_CANDIDATES)];
        let prompt = selection_prompt(candidates, persona, count);
        info!(target: TARGET_LLM_REQUEST, "Asking {} to select {} of {} articles for {}", self.oracle.name(), count, candidates.len(), persona.name);

        match self.ask(&prompt, self.settings.select_timeout).await {
            Ok(response) => {
                let mut picks = parse_selection_blocks(&response);
                if picks.is_empty() {
                    warn!(target: TARGET_LLM_REQUEST, "No parseable selections in oracle response, using first {} articles", count);
                    debug!(target: TARGET_LLM_REQUEST, "Unparseable selection response: {}", response);
                    return fallback(articles, count);
                }
                picks.truncate(count);
                Selection::Ranked(picks)
            }
            Err(err) => {
                warn!(target: TARGET_LLM_REQUEST, "Selection with {} failed ({}), using first {} articles", self.oracle.name(), err, count);
                fallback(articles, count)
            }
        }
    }

    async fn ask(&self, prompt: &str, limit: Duration) -> Result<String, OracleError> {
        match timeout(limit, self.oracle.complete(prompt)).await {
            Ok(Ok(text)) if text.trim().is_empty() => Err(OracleError::EmptyResponse),
            Ok(Ok(text)) => Ok(text),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(OracleError::Timeout(limit)),
        }
    }
}

fn fallback(articles: &[Article], count: usize) -> Selection {
    Selection::Fallback(articles.iter().take(count).cloned().collect())
}
