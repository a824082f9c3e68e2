//! Runtime configuration, read once from the environment and passed into
//! constructors.

use std::time::Duration;
use tracing::debug;

use crate::article::Domain;
use crate::environment::{get_env_var, get_env_var_parsed, parse_value, split_list};
use crate::error::ConfigError;
use crate::oracle::{AdapterSettings, OllamaEndpoint, OracleConfig};
use crate::pool::DEFAULT_CACHE_TTL;
use crate::rss::FeedSource;

pub const SOURCES_VAR: &str = "CURATOR_SOURCES";
pub const ENDPOINTS_VAR: &str = "OLLAMA_ENDPOINTS";

/// Feeds used when `CURATOR_SOURCES` is not set.
const DEFAULT_SOURCES: &[(&str, &str)] = &[
    ("arXiv AI", "https://arxiv.org/rss/cs.AI"),
    ("arXiv ML", "https://arxiv.org/rss/cs.LG"),
    ("Google AI Blog", "https://ai.googleblog.com/feeds/posts/default"),
    ("OpenAI Blog", "https://openai.com/blog/feed.rss"),
    ("DeepMind Blog", "https://www.deepmind.com/blog/feed/rss.xml"),
    ("Hugging Face Blog", "https://huggingface.co/blog/feed.xml"),
    ("TechCrunch AI", "https://techcrunch.com/category/artificial-intelligence/feed/"),
];

#[derive(Debug, Clone)]
pub struct CuratorConfig {
    pub sources: Vec<FeedSource>,
    pub oracle: OracleConfig,
    pub adapter: AdapterSettings,
    /// Zero disables the pool cache.
    pub cache_ttl: Duration,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        CuratorConfig {
            sources: default_sources(),
            oracle: OracleConfig::default(),
            adapter: AdapterSettings::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl CuratorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = CuratorConfig::default();

        let sources = match get_env_var(SOURCES_VAR) {
            Some(value) => parse_sources(&value)?,
            None => defaults.sources,
        };

        let endpoints = match get_env_var(ENDPOINTS_VAR) {
            Some(value) => parse_endpoints(&value)?,
            None => defaults.oracle.endpoints,
        };

        let oracle = OracleConfig {
            endpoints,
            model: get_env_var("OLLAMA_MODEL").unwrap_or(defaults.oracle.model),
            temperature: get_env_var_parsed("LLM_TEMPERATURE", defaults.oracle.temperature)?,
            endpoint_timeout: Duration::from_secs(get_env_var_parsed(
                "OLLAMA_ENDPOINT_TIMEOUT_SECS",
                defaults.oracle.endpoint_timeout.as_secs(),
            )?),
        };

        let adapter = AdapterSettings {
            classify_timeout: Duration::from_secs(get_env_var_parsed(
                "CLASSIFY_TIMEOUT_SECS",
                defaults.adapter.classify_timeout.as_secs(),
            )?),
            select_timeout: Duration::from_secs(get_env_var_parsed(
                "SELECT_TIMEOUT_SECS",
                defaults.adapter.select_timeout.as_secs(),
            )?),
            negation_aware: get_env_var_parsed("STRICT_VERDICT", defaults.adapter.negation_aware)?,
        };

        let cache_ttl = Duration::from_secs(get_env_var_parsed(
            "POOL_CACHE_TTL_SECS",
            defaults.cache_ttl.as_secs(),
        )?);

        let config = CuratorConfig {
            sources,
            oracle,
            adapter,
            cache_ttl,
        };
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}

pub fn default_sources() -> Vec<FeedSource> {
    DEFAULT_SOURCES
        .iter()
        .map(|(name, url)| FeedSource::new(*name, *url))
        .collect()
}

/// Parses `name|url[|research|news];...`. A blank name is allowed; the
/// normalizer substitutes the default source name.
pub fn parse_sources(value: &str) -> Result<Vec<FeedSource>, ConfigError> {
    let mut sources = Vec::new();

    for item in split_list(value, ';') {
        let parts: Vec<&str> = item.split('|').map(str::trim).collect();
        let source = match parts.as_slice() {
            [name, url] => FeedSource::new(*name, *url),
            [name, url, domain] => {
                let domain = Domain::parse(domain).ok_or_else(|| {
                    ConfigError::invalid(SOURCES_VAR, &item, "domain must be research or news")
                })?;
                FeedSource::new(*name, *url).with_domain(domain)
            }
            _ => {
                return Err(ConfigError::invalid(
                    SOURCES_VAR,
                    &item,
                    "expected name|url or name|url|domain",
                ))
            }
        };
        if source.url.is_empty() {
            return Err(ConfigError::invalid(SOURCES_VAR, &item, "missing url"));
        }
        sources.push(source);
    }

    if sources.is_empty() {
        return Err(ConfigError::invalid(SOURCES_VAR, value, "no sources listed"));
    }
    Ok(sources)
}

/// Parses `host|port;...` into an ordered endpoint list.
pub fn parse_endpoints(value: &str) -> Result<Vec<OllamaEndpoint>, ConfigError> {
    let endpoints = split_list(value, ';')
        .iter()
        .map(|item| match item.split_once('|') {
            Some((host, port)) if !host.trim().is_empty() => {
                let endpoint =
                    OllamaEndpoint::new(host.trim(), parse_value::<u16>(ENDPOINTS_VAR, port)?);
                endpoint
                    .url()
                    .map_err(|reason| ConfigError::invalid(ENDPOINTS_VAR, item, reason))?;
                Ok(endpoint)
            }
            _ => Err(ConfigError::invalid(ENDPOINTS_VAR, item, "expected host|port")),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if endpoints.is_empty() {
        return Err(ConfigError::invalid(ENDPOINTS_VAR, value, "no endpoints listed"));
    }
    Ok(endpoints)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CuratorConfig::default();
        assert_eq!(config.sources.len(), 7);
        assert_eq!(config.sources[0].name, "arXiv AI");
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert!(config.adapter.negation_aware);
    }

    #[test]
    fn test_parse_sources() {
        let sources =
            parse_sources("Lab Blog|https://lab.example.com/rss ; Papers|https://papers.example.com/feed|research;")
                .unwrap();

        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0], FeedSource::new("Lab Blog", "https://lab.example.com/rss"));
        assert_eq!(sources[1].domain, Some(Domain::Research));
    }

    #[test]
    fn test_parse_sources_rejects_malformed_items() {
        assert!(parse_sources("just-a-name").is_err());
        assert!(parse_sources("Name|").is_err());
        assert!(parse_sources("Name|https://a.example.com|gossip").is_err());
        assert!(parse_sources(" ; ").is_err());
    }

    #[test]
    fn test_parse_endpoints() {
        let endpoints = parse_endpoints("gpu-box|11435;127.0.0.1|11434").unwrap();
        assert_eq!(
            endpoints,
            vec![
                OllamaEndpoint::new("gpu-box", 11435),
                OllamaEndpoint::new("127.0.0.1", 11434),
            ]
        );

        assert!(parse_endpoints("gpu-box").is_err());
        assert!(parse_endpoints("gpu-box|eleven").is_err());
        assert!(parse_endpoints("|11434").is_err());
    }

    #[test]
    fn test_parse_endpoints_rejects_hosts_that_are_not_urls() {
        let err = parse_endpoints("gpu box|11434").unwrap_err();
        assert!(err.to_string().contains(ENDPOINTS_VAR));
        assert!(err.to_string().contains("gpu box"));

        assert!(parse_endpoints("127.0.0.1|11435;bad host|11434").is_err());
        assert!(parse_endpoints("https://gpu.internal|443").is_ok());
    }
}
