use async_trait::async_trait;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::options::GenerationOptions;
use ollama_rs::Ollama;
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use url::Url;

use super::TextOracle;
use crate::error::{ConfigError, OracleError};
use crate::TARGET_LLM_REQUEST;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-endpoint ceiling, so a hung primary leaves time for the secondary
/// within the selection budget.
pub const DEFAULT_ENDPOINT_TIMEOUT: Duration = Duration::from_secs(150);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaEndpoint {
    pub host: String,
    pub port: u16,
}

impl OllamaEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        OllamaEndpoint {
            host: host.into(),
            port,
        }
    }

    /// Host with a scheme, as the Ollama client expects.
    pub fn host_with_scheme(&self) -> String {
        if self.host.contains("://") {
            self.host.clone()
        } else {
            format!("http://{}", self.host)
        }
    }

    /// Base URL of the endpoint, or why the host cannot form one.
    pub fn url(&self) -> Result<Url, String> {
        let mut url = Url::parse(&self.host_with_scheme()).map_err(|e| e.to_string())?;
        if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
            return Err("expected an http(s) host".to_string());
        }
        url.set_port(Some(self.port))
            .map_err(|_| "host cannot carry a port".to_string())?;
        Ok(url)
    }
}

impl fmt::Display for OllamaEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Where and how to reach the text oracle. Endpoints are tried in order.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub endpoints: Vec<OllamaEndpoint>,
    pub model: String,
    pub temperature: f32,
    /// Ceiling for one request to one endpoint.
    pub endpoint_timeout: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        OracleConfig {
            // 11435 first: the default port is often busy with other clients.
            endpoints: vec![
                OllamaEndpoint::new("127.0.0.1", 11435),
                OllamaEndpoint::new("127.0.0.1", 11434),
            ],
            model: "mistral".to_string(),
            temperature: 0.1,
            endpoint_timeout: DEFAULT_ENDPOINT_TIMEOUT,
        }
    }
}

#[derive(Debug)]
pub enum EndpointStatus {
    Up(Vec<String>), // Available models
    Down(String),    // Error message
}

/// A `TextOracle` backed by one or more Ollama servers.
pub struct OllamaOracle {
    clients: Vec<(OllamaEndpoint, Ollama)>,
    model: String,
    temperature: f32,
    endpoint_timeout: Duration,
}

impl OllamaOracle {
    pub fn new(config: &OracleConfig) -> Result<Self, ConfigError> {
        let clients = config
            .endpoints
            .iter()
            .map(|endpoint| {
                let url = endpoint.url().map_err(|reason| {
                    ConfigError::invalid("OLLAMA_ENDPOINTS", &endpoint.to_string(), reason)
                })?;
                Ok((endpoint.clone(), Ollama::from_url(url)))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(OllamaOracle {
            clients,
            model: config.model.clone(),
            temperature: config.temperature,
            endpoint_timeout: config.endpoint_timeout,
        })
    }

    /// Lists the models available at each endpoint.
    pub async fn check_endpoints(&self) -> Vec<(OllamaEndpoint, EndpointStatus)> {
        let mut results = Vec::with_capacity(self.clients.len());

        for (endpoint, client) in &self.clients {
            info!(target: TARGET_LLM_REQUEST, "Testing Ollama endpoint at {}", endpoint);
            let status = match timeout(CONNECTION_TIMEOUT, client.list_local_models()).await {
                Ok(Ok(models)) => EndpointStatus::Up(models.into_iter().map(|m| m.name).collect()),
                Ok(Err(e)) => EndpointStatus::Down(format!("API error: {}", e)),
                Err(_) => EndpointStatus::Down("Connection timed out".to_string()),
            };
            results.push((endpoint.clone(), status));
        }

        results
    }
}

#[async_trait]
impl TextOracle for OllamaOracle {
    fn name(&self) -> String {
        format!("ollama/{}", self.model)
    }

    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        if self.clients.is_empty() {
            return Err(OracleError::NoEndpoints);
        }

        let mut failures = Vec::new();
        for (endpoint, client) in &self.clients {
            let mut request = GenerationRequest::new(self.model.clone(), prompt.to_string());
            request.options = Some(GenerationOptions::default().temperature(self.temperature));

            debug!(target: TARGET_LLM_REQUEST, "Sending LLM request to {} with prompt: {}", endpoint, prompt);

            match timeout(self.endpoint_timeout, client.generate(request)).await {
                Ok(Ok(response)) => {
                    debug!(target: TARGET_LLM_REQUEST, "LLM response received from {}: {}", endpoint, response.response);
                    return Ok(response.response);
                }
                Ok(Err(e)) => {
                    warn!(target: TARGET_LLM_REQUEST, "Ollama endpoint {} failed: {}", endpoint, e);
                    failures.push(format!("{}: {}", endpoint, e));
                }
                Err(_) => {
                    warn!(target: TARGET_LLM_REQUEST, "Ollama endpoint {} timed out after {:?}", endpoint, self.endpoint_timeout);
                    failures.push(format!("{}: timed out after {:?}", endpoint, self.endpoint_timeout));
                }
            }
        }

        Err(OracleError::Unavailable(failures.join("; ")))
    }
}
