//! The feed fetch capability and its HTTP implementation.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header;
use tracing::{debug, info};

use super::client::{create_http_client, fetch_with_fallback};
use super::parser::parse_feed;
use super::types::{FeedSource, RawEntry};
use super::util::{decode_body, is_valid_url};
use crate::TARGET_WEB_REQUEST;

/// Anything that can turn a configured source into raw feed entries.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<RawEntry>>;
}

/// Fetches feeds over HTTP and parses RSS, Atom and JSON Feed bodies.
pub struct HttpFeedFetcher {
    standard: reqwest::Client,
    browser: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new() -> Result<Self> {
        Ok(HttpFeedFetcher {
            standard: create_http_client(false)?,
            browser: create_http_client(true)?,
        })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<RawEntry>> {
        if !is_valid_url(&source.url) {
            return Err(anyhow!("Invalid feed URL for {}: {}", source.name, source.url));
        }

        let (response, browser_emulation_used) =
            fetch_with_fallback(&self.standard, &self.browser, &source.url).await?;
        if browser_emulation_used {
            info!(target: TARGET_WEB_REQUEST, "Browser emulation was required for {}", source.url);
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(|s| s.to_lowercase());
        debug!(target: TARGET_WEB_REQUEST, "Response Content-Type for {}: {:?}", source.url, content_type);

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {}", source.url))?;
        let body = decode_body(&bytes, content_type.as_deref());

        let entries = parse_feed(&body, content_type.as_deref())
            .with_context(|| format!("Failed to parse feed from {}", source.url))?;
        debug!(target: TARGET_WEB_REQUEST, "Parsed {} entries from {}", entries.len(), source.url);

        Ok(entries)
    }
}
