//! In-memory fetchers, oracles and fixtures shared by unit tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::article::{Article, Domain};
use crate::error::OracleError;
use crate::oracle::TextOracle;
use crate::persona::Persona;
use crate::rss::{FeedFetcher, FeedSource, RawEntry};

type Responder = Box<dyn Fn(&str) -> Result<String, OracleError> + Send + Sync>;

/// A `TextOracle` answering from a closure, optionally after a delay.
pub struct StubOracle {
    responder: Responder,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubOracle {
    pub fn answering<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, OracleError> + Send + Sync + 'static,
    {
        StubOracle {
            responder: Box::new(responder),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn replying(response: &str) -> Self {
        let response = response.to_string();
        Self::answering(move |_| Ok(response.clone()))
    }

    pub fn failing() -> Self {
        Self::answering(|_| Err(OracleError::Unavailable("connection refused".to_string())))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextOracle for StubOracle {
    fn name(&self) -> String {
        "stub".to_string()
    }

    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(prompt)
    }
}

/// A `FeedFetcher` serving canned entries per URL. Unknown URLs fail.
#[derive(Default)]
pub struct StubFetcher {
    entries: HashMap<String, Vec<RawEntry>>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(mut self, url: &str, count: usize) -> Self {
        let entries = (0..count)
            .map(|i| RawEntry {
                title: Some(format!("{} entry {}", url, i)),
                summary: Some(format!("<p>Summary of entry {}</p>", i)),
                link: Some(format!("{}/item-{}", url, i)),
                published: Some("Mon, 06 Jan 2025 09:00:00 GMT".to_string()),
                ..RawEntry::default()
            })
            .collect();
        self.entries.insert(url.to_string(), entries);
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedFetcher for StubFetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<RawEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&source.url) {
            return Err(anyhow!("HTTP 503 Service Unavailable for {}", source.url));
        }
        self.entries
            .get(&source.url)
            .cloned()
            .ok_or_else(|| anyhow!("no route to {}", source.url))
    }
}

/// `count` articles titled "Story 00", "Story 01", ... in pool order.
pub fn sample_articles(count: usize) -> Vec<Article> {
    (0..count)
        .map(|i| Article {
            title: format!("Story {:02}", i),
            summary: format!("What happened in story {}.", i),
            link: format!("https://news.example.com/story-{:02}", i),
            source: "Example Wire".to_string(),
            published: "Mon, 06 Jan 2025 09:00:00 GMT".to_string(),
            domain: Some(Domain::News),
        })
        .collect()
}

pub fn test_persona() -> Persona {
    Persona::new("Testers", "For people who break software", &["qa", "bugs"])
}

/// Raw requests received by a local test server, in arrival order.
pub type RecordedRequests = Arc<Mutex<Vec<String>>>;

pub fn http_response(status: u16, content_type: &str, body: &str) -> String {
    let reason = match status {
        200 => "OK",
        403 => "Forbidden",
        503 => "Service Unavailable",
        _ => "Status",
    };
    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        content_type,
        body.len(),
        body
    )
}

/// Serves one canned response per connection, in order, on a local port.
pub async fn spawn_http_server(responses: Vec<String>) -> (SocketAddr, RecordedRequests) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    let requests: RecordedRequests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    tokio::spawn(async move {
        for response in responses {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let request = read_request(&mut stream).await;
            recorded.lock().expect("request log").push(request);
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (addr, requests)
}

/// Accepts connections and never answers them.
pub async fn spawn_silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    addr
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}
