//! The curation engine: applies the relevance adapter to an article pool for
//! one persona and produces a bounded, ordered result.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::article::{Article, Domain, DEFAULT_SOURCE};
use crate::error::CurationError;
use crate::oracle::{RankedPick, RelevanceAdapter, Selection, Verdict};
use crate::persona::Persona;
use crate::TARGET_CURATION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CurationMode {
    /// One yes/no classification per article, pool order preserved.
    Filter,
    /// One ranked selection over the whole pool.
    Select,
}

impl fmt::Display for CurationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurationMode::Filter => write!(f, "filter"),
            CurationMode::Select => write!(f, "select"),
        }
    }
}

impl FromStr for CurationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "filter" => Ok(CurationMode::Filter),
            "select" => Ok(CurationMode::Select),
            other => Err(format!("unknown curation mode: {}", other)),
        }
    }
}

/// One entry handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CuratedItem {
    pub title: String,
    pub source: String,
    pub link: String,
    pub summary: Option<String>,
    pub published: Option<String>,
    pub domain: Option<Domain>,
    /// The oracle's explanation, present only for ranked selections.
    pub relevance: Option<String>,
}

impl From<&Article> for CuratedItem {
    fn from(article: &Article) -> Self {
        CuratedItem {
            title: article.title.clone(),
            source: article.source.clone(),
            link: article.link.clone(),
            summary: Some(article.summary.clone()).filter(|s| !s.is_empty()),
            published: Some(article.published.clone()),
            domain: article.domain,
            relevance: None,
        }
    }
}

impl CuratedItem {
    /// Builds an item from an oracle pick, borrowing summary, date and domain
    /// from the pool article with the same link when there is one.
    fn from_pick(pick: RankedPick, pool: &[Article]) -> Self {
        let matched = pool.iter().find(|a| a.link.trim() == pick.link.trim());

        let source = Some(pick.source)
            .filter(|s| !s.is_empty())
            .or_else(|| matched.map(|a| a.source.clone()))
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

        CuratedItem {
            title: pick.title,
            source,
            link: pick.link,
            summary: matched
                .map(|a| a.summary.clone())
                .filter(|s| !s.is_empty()),
            published: matched.map(|a| a.published.clone()),
            domain: matched.and_then(|a| a.domain),
            relevance: Some(pick.relevance).filter(|r| !r.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurationResult {
    pub persona: String,
    pub mode: CurationMode,
    pub requested: usize,
    /// At most `requested` items, in relevance order when the oracle ranked
    /// them and pool order otherwise.
    pub items: Vec<CuratedItem>,
    /// Articles judged relevant before capping (filter mode), or the number
    /// of items (select mode).
    pub total_relevant: usize,
    /// The oracle could not be used and the items came from a fallback.
    pub degraded: bool,
}

pub struct CurationEngine {
    adapter: RelevanceAdapter,
    personas: Vec<Persona>,
}

impl CurationEngine {
    pub fn new(adapter: RelevanceAdapter) -> Self {
        CurationEngine {
            adapter,
            personas: Persona::catalog(),
        }
    }

    pub fn with_personas(mut self, personas: Vec<Persona>) -> Self {
        self.personas = personas;
        self
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn resolve_persona(&self, name: &str) -> Result<&Persona, CurationError> {
        Persona::find(&self.personas, name)
            .ok_or_else(|| CurationError::UnknownPersona(name.trim().to_string()))
    }

    pub async fn curate(
        &self,
        pool: &[Article],
        persona: &str,
        count: usize,
        mode: CurationMode,
    ) -> Result<CurationResult, CurationError> {
        self.curate_with_progress(pool, persona, count, mode, |_, _| {})
            .await
    }

    /// Like `curate`, reporting `(done, total)` after each classification in
    /// filter mode. Arguments are validated before any oracle call.
    pub async fn curate_with_progress<F>(
        &self,
        pool: &[Article],
        persona: &str,
        count: usize,
        mode: CurationMode,
        progress: F,
    ) -> Result<CurationResult, CurationError>
    where
        F: FnMut(usize, usize),
    {
        if count == 0 {
            return Err(CurationError::InvalidCount);
        }
        let persona = self.resolve_persona(persona)?;

        info!(target: TARGET_CURATION, "Curating {} articles for {} ({} mode, {} requested)", pool.len(), persona.name, mode, count);

        let result = match mode {
            CurationMode::Filter => self.filter(pool, persona, count, progress).await,
            CurationMode::Select => self.select(pool, persona, count).await,
        };

        info!(target: TARGET_CURATION, "Curated {} of {} articles for {}{}", result.items.len(), pool.len(), persona.name, if result.degraded { " (degraded)" } else { "" });

        Ok(result)
    }

    async fn filter<F>(
        &self,
        pool: &[Article],
        persona: &Persona,
        count: usize,
        mut progress: F,
    ) -> CurationResult
    where
        F: FnMut(usize, usize),
    {
        let mut relevant = Vec::new();
        let mut failures = 0;

        for (index, article) in pool.iter().enumerate() {
            match self
                .adapter
                .classify(&article.title, &article.summary, persona)
                .await
            {
                Verdict::Relevant => relevant.push(article),
                Verdict::NotRelevant => {}
                Verdict::Unavailable => failures += 1,
            }
            progress(index + 1, pool.len());
        }

        if failures > 0 {
            warn!(target: TARGET_CURATION, "Oracle unavailable for {} of {} classifications", failures, pool.len());
        }

        CurationResult {
            persona: persona.name.clone(),
            mode: CurationMode::Filter,
            requested: count,
            items: relevant
                .iter()
                .take(count)
                .map(|article| CuratedItem::from(*article))
                .collect(),
            total_relevant: relevant.len(),
            degraded: !pool.is_empty() && failures == pool.len(),
        }
    }

    async fn select(&self, pool: &[Article], persona: &Persona, count: usize) -> CurationResult {
        if pool.is_empty() {
            debug!(target: TARGET_CURATION, "Empty pool, nothing to select for {}", persona.name);
        }

        let selection = self.adapter.select_top(pool, persona, count).await;
        let degraded = selection.is_fallback() && !pool.is_empty();

        let items: Vec<CuratedItem> = match selection {
            Selection::Ranked(picks) => picks
                .into_iter()
                .map(|pick| CuratedItem::from_pick(pick, pool))
                .collect(),
            Selection::Fallback(articles) => articles.iter().map(CuratedItem::from).collect(),
        };

        CurationResult {
            persona: persona.name.clone(),
            mode: CurationMode::Select,
            requested: count,
            total_relevant: items.len(),
            items,
            degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::AdapterSettings;
    use crate::test_support::{sample_articles, test_persona, StubOracle};
    use std::sync::Arc;

    fn engine(oracle: StubOracle) -> CurationEngine {
        CurationEngine::new(RelevanceAdapter::new(
            Arc::new(oracle),
            AdapterSettings::default(),
        ))
        .with_personas(vec![test_persona()])
    }

    fn relevant_titles(indices: &[usize]) -> StubOracle {
        let titles: Vec<String> = indices.iter().map(|i| format!("Story {:02}", i)).collect();
        StubOracle::answering(move |prompt| {
            let relevant = titles
                .iter()
                .any(|title| prompt.contains(&format!("Article Title: {}\n", title)));
            Ok(if relevant { "Yes" } else { "No" }.to_string())
        })
    }

    #[tokio::test]
    async fn test_filter_keeps_relevant_in_pool_order() {
        let engine = engine(relevant_titles(&[7, 1, 4]));
        let pool = sample_articles(10);

        let result = engine
            .curate(&pool, "Testers", 3, CurationMode::Filter)
            .await
            .unwrap();

        let expected: Vec<CuratedItem> = [1, 4, 7].iter().map(|&i| CuratedItem::from(&pool[i])).collect();
        assert_eq!(result.items, expected);
        assert_eq!(result.total_relevant, 3);
        assert!(!result.degraded);
    }

    #[tokio::test]
    async fn test_filter_caps_displayed_items_only() {
        let engine = engine(relevant_titles(&[0, 2, 3, 5, 8]));
        let pool = sample_articles(10);

        let result = engine
            .curate(&pool, "Testers", 3, CurationMode::Filter)
            .await
            .unwrap();

        let titles: Vec<_> = result.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Story 00", "Story 02", "Story 03"]);
        assert_eq!(result.total_relevant, 5);
    }

    #[tokio::test]
    async fn test_filter_reports_progress() {
        let engine = engine(relevant_titles(&[]));
        let pool = sample_articles(4);
        let mut seen = Vec::new();

        engine
            .curate_with_progress(&pool, "Testers", 2, CurationMode::Filter, |done, total| {
                seen.push((done, total))
            })
            .await
            .unwrap();

        assert_eq!(seen, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
    }

    #[tokio::test]
    async fn test_filter_with_unavailable_oracle_is_degraded_and_empty() {
        let engine = engine(StubOracle::failing());
        let result = engine
            .curate(&sample_articles(5), "Testers", 3, CurationMode::Filter)
            .await
            .unwrap();

        assert!(result.items.is_empty());
        assert!(result.degraded);
    }

    #[tokio::test]
    async fn test_select_discards_block_without_link() {
        let response = "TITLE: Story 03\nSOURCE: Example Wire\nRELEVANCE: First reason\nLINK: https://news.example.com/story-03\n---\n\
TITLE: Story 06\nSOURCE: Example Wire\nRELEVANCE: Second reason\nLINK: https://news.example.com/story-06\n---\n\
TITLE: Story 08\nSOURCE: Example Wire\nRELEVANCE: Missing link\n---\n";
        let engine = engine(StubOracle::replying(response));
        let pool = sample_articles(10);

        let result = engine
            .curate(&pool, "Testers", 3, CurationMode::Select)
            .await
            .unwrap();

        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].title, "Story 03");
        assert_eq!(result.items[0].relevance.as_deref(), Some("First reason"));
        // Enriched from the matching pool article.
        assert_eq!(result.items[0].summary.as_deref(), Some(pool[3].summary.as_str()));
        assert_eq!(result.items[1].title, "Story 06");
        assert!(!result.degraded);
    }

    #[tokio::test]
    async fn test_select_pick_without_pool_match_keeps_oracle_fields() {
        let response = "TITLE: Invented\nRELEVANCE: Hallucinated\nLINK: https://elsewhere.example.com\n---";
        let engine = engine(StubOracle::replying(response));

        let result = engine
            .curate(&sample_articles(3), "Testers", 2, CurationMode::Select)
            .await
            .unwrap();

        assert_eq!(result.items.len(), 1);
        let item = &result.items[0];
        assert_eq!(item.source, DEFAULT_SOURCE);
        assert!(item.summary.is_none());
        assert!(item.published.is_none());
    }

    #[tokio::test]
    async fn test_select_falls_back_when_oracle_fails() {
        let engine = engine(StubOracle::failing());
        let pool = sample_articles(6);

        let result = engine
            .curate(&pool, "testers", 4, CurationMode::Select)
            .await
            .unwrap();

        let expected: Vec<CuratedItem> = pool[..4].iter().map(CuratedItem::from).collect();
        assert_eq!(result.items, expected);
        assert!(result.degraded);
    }

    #[tokio::test]
    async fn test_empty_pool_is_a_valid_empty_result() {
        for mode in [CurationMode::Filter, CurationMode::Select] {
            let engine = engine(StubOracle::replying("yes"));
            let result = engine.curate(&[], "Testers", 3, mode).await.unwrap();
            assert!(result.items.is_empty());
            assert!(!result.degraded);
        }
    }

    #[tokio::test]
    async fn test_invalid_arguments_rejected_before_oracle_calls() {
        let oracle = Arc::new(StubOracle::replying("yes"));
        let engine = CurationEngine::new(RelevanceAdapter::new(
            oracle.clone(),
            AdapterSettings::default(),
        ));
        let pool = sample_articles(3);

        assert_eq!(
            engine
                .curate(&pool, "Students and Researchers", 0, CurationMode::Filter)
                .await,
            Err(CurationError::InvalidCount)
        );
        assert_eq!(
            engine
                .curate(&pool, "Astronauts", 2, CurationMode::Select)
                .await,
            Err(CurationError::UnknownPersona("Astronauts".to_string()))
        );
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_curation_is_idempotent() {
        let engine = engine(relevant_titles(&[2, 5, 9]));
        let pool = sample_articles(10);

        for mode in [CurationMode::Filter, CurationMode::Select] {
            let first = engine.curate(&pool, "Testers", 2, mode).await.unwrap();
            let second = engine.curate(&pool, "Testers", 2, mode).await.unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Filter".parse::<CurationMode>(), Ok(CurationMode::Filter));
        assert_eq!(" select ".parse::<CurationMode>(), Ok(CurationMode::Select));
        assert!("rank".parse::<CurationMode>().is_err());
    }
}
