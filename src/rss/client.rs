//! HTTP client creation and request handling for RSS feeds.

use anyhow::{anyhow, Result};
use reqwest::cookie::Jar;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info};

use super::types::REQUEST_TIMEOUT;
use crate::TARGET_WEB_REQUEST;

const STANDARD_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const FEED_ACCEPT: &str = "application/feed+json, application/json, application/rss+xml, application/atom+xml, application/xml, text/xml, */*;q=0.9";
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:138.0) Gecko/20100101 Firefox/138.0";

/// Create a client with either standard or browser emulation settings. The
/// standard client asks for feed formats; the browser client sends the headers
/// of a desktop Firefox and keeps cookies between requests.
pub fn create_http_client(browser_emulation: bool) -> Result<reqwest::Client> {
    let builder = reqwest::Client::builder()
        .gzip(true)
        .brotli(true)
        .redirect(reqwest::redirect::Policy::default());

    let builder = if browser_emulation {
        debug!(target: TARGET_WEB_REQUEST, "Creating browser emulation HTTP client");
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(header::DNT, HeaderValue::from_static("1"));
        headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
        headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
        headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
        builder
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .cookie_store(true)
            .cookie_provider(Arc::new(Jar::default()))
    } else {
        debug!(target: TARGET_WEB_REQUEST, "Creating standard HTTP client");
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(FEED_ACCEPT));
        builder.user_agent(STANDARD_USER_AGENT).default_headers(headers)
    };

    builder
        .build()
        .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))
}

/// Request `url` with the standard client, then once more with browser-like
/// headers if that fails. Returns the response and whether emulation was
/// needed.
pub async fn fetch_with_fallback(
    standard: &reqwest::Client,
    browser: &reqwest::Client,
    url: &str,
) -> Result<(reqwest::Response, bool)> {
    debug!(target: TARGET_WEB_REQUEST, "Attempting standard request to {}", url);

    let standard_result = timeout(
        REQUEST_TIMEOUT,
        standard.get(url).send(),
    )
    .await;

    let standard_error = match standard_result {
        Ok(Ok(resp)) if resp.status().is_success() => {
            debug!(target: TARGET_WEB_REQUEST, "Standard request to {} succeeded", url);
            return Ok((resp, false));
        }
        Ok(Ok(resp)) => format!("HTTP error: {}", resp.status()),
        Ok(Err(err)) => format!("Request failed: {}", err),
        Err(_) => format!(
            "Request timed out after {} seconds",
            REQUEST_TIMEOUT.as_secs()
        ),
    };

    debug!(target: TARGET_WEB_REQUEST, "Standard request to {} failed ({}), trying browser emulation", url, standard_error);

    let browser_result = timeout(
        REQUEST_TIMEOUT,
        browser.get(url).send(),
    )
    .await;

    let browser_error = match browser_result {
        Ok(Ok(resp)) if resp.status().is_success() => {
            info!(target: TARGET_WEB_REQUEST, "Browser emulation request to {} succeeded", url);
            return Ok((resp, true));
        }
        Ok(Ok(resp)) => format!("HTTP error: {}", resp.status()),
        Ok(Err(err)) => format!("Request failed: {}", err),
        Err(_) => format!(
            "Request timed out after {} seconds",
            REQUEST_TIMEOUT.as_secs()
        ),
    };

    Err(anyhow!(
        "Both standard and browser emulation requests failed for {}: standard: {}; browser emulation: {}",
        url,
        standard_error,
        browser_error
    ))
}
