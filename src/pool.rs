//! Aggregates normalized articles across the configured feed sources.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::article::Article;
use crate::normalizer::normalize;
use crate::rss::{FeedFetcher, FeedSource};
use crate::TARGET_WEB_REQUEST;

/// Entries taken from each source, keeping representation balanced.
pub const MAX_ENTRIES_PER_SOURCE: usize = 5;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// A source that contributed nothing this cycle.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub source: String,
    pub error: String,
}

/// Outcome of a pool build, including the failures that were skipped.
#[derive(Debug, Clone, Default)]
pub struct PoolBuild {
    pub articles: Vec<Article>,
    pub failures: Vec<SourceFailure>,
    pub from_cache: bool,
}

struct CachedPool {
    fetched_at: Instant,
    articles: Vec<Article>,
}

/// Time-bounded pool cache keyed by the source-list configuration. Concurrent
/// refreshes of one key are last-write-wins.
pub struct PoolCache {
    ttl: Duration,
    entries: DashMap<String, CachedPool>,
}

impl PoolCache {
    pub fn new(ttl: Duration) -> Self {
        PoolCache {
            ttl,
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<Article>> {
        if let Some(cached) = self.entries.get(key) {
            if cached.fetched_at.elapsed() < self.ttl {
                return Some(cached.articles.clone());
            }
        }
        self.entries
            .remove_if(key, |_, cached| cached.fetched_at.elapsed() >= self.ttl);
        None
    }

    pub fn insert(&self, key: String, articles: Vec<Article>) {
        self.entries.insert(
            key,
            CachedPool {
                fetched_at: Instant::now(),
                articles,
            },
        );
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Cache key for a source list: order matters since it determines pool order,
/// and an explicit domain changes the articles built from a source.
pub fn cache_key(sources: &[FeedSource]) -> String {
    sources
        .iter()
        .map(|source| match source.domain {
            Some(domain) => format!("{}={}|{:?}", source.name, source.url, domain),
            None => format!("{}={}", source.name, source.url),
        })
        .collect::<Vec<_>>()
        .join(";")
}

pub struct PoolBuilder {
    fetcher: Arc<dyn FeedFetcher>,
    cache: Option<PoolCache>,
}

impl PoolBuilder {
    pub fn new(fetcher: Arc<dyn FeedFetcher>) -> Self {
        PoolBuilder {
            fetcher,
            cache: None,
        }
    }

    /// Enables the pool cache; a zero TTL leaves it disabled.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = (!ttl.is_zero()).then(|| PoolCache::new(ttl));
        self
    }

    pub async fn build_pool(&self, sources: &[FeedSource]) -> Vec<Article> {
        self.build_pool_with_report(sources).await.articles
    }

    /// Fetches every source in order, normalizing at most
    /// `MAX_ENTRIES_PER_SOURCE` entries from each. Failing sources are
    /// skipped and reported, never retried.
    pub async fn build_pool_with_report(&self, sources: &[FeedSource]) -> PoolBuild {
        let key = cache_key(sources);
        if let Some(articles) = self.cache.as_ref().and_then(|cache| cache.get(&key)) {
            debug!(target: TARGET_WEB_REQUEST, "Serving {} cached articles for {} sources", articles.len(), sources.len());
            return PoolBuild {
                articles,
                failures: Vec::new(),
                from_cache: true,
            };
        }

        let mut build = PoolBuild::default();
        for source in sources {
            match self.fetcher.fetch(source).await {
                Ok(entries) => {
                    let before = build.articles.len();
                    build.articles.extend(
                        entries
                            .iter()
                            .take(MAX_ENTRIES_PER_SOURCE)
                            .map(|entry| normalize(entry, source)),
                    );
                    debug!(target: TARGET_WEB_REQUEST, "Took {} of {} entries from {}", build.articles.len() - before, entries.len(), source.name);
                }
                Err(err) => {
                    warn!(target: TARGET_WEB_REQUEST, "Could not fetch from {}: {:#}", source.name, err);
                    build.failures.push(SourceFailure {
                        source: source.name.clone(),
                        error: format!("{:#}", err),
                    });
                }
            }
        }

        info!(target: TARGET_WEB_REQUEST, "Built pool of {} articles from {} of {} sources", build.articles.len(), sources.len() - build.failures.len(), sources.len());

        // A cycle where every source failed is not worth remembering.
        if let Some(cache) = &self.cache {
            if build.failures.len() < sources.len() {
                cache.insert(key, build.articles.clone());
            }
        }

        build
    }

    pub fn invalidate(&self, sources: &[FeedSource]) {
        if let Some(cache) = &self.cache {
            cache.invalidate(&cache_key(sources));
        }
    }
}
