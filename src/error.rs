use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to callers of the curation engine. Everything else is
/// absorbed into degraded results and logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurationError {
    #[error("requested article count must be at least 1")]
    InvalidCount,

    #[error("unknown persona: {0}")]
    UnknownPersona(String),
}

/// Failures of the text oracle. The relevance adapter converts these into
/// `Verdict::Unavailable` or a fallback selection.
#[derive(Error, Debug, Clone)]
pub enum OracleError {
    #[error("no oracle endpoint configured")]
    NoEndpoints,

    #[error("oracle unavailable on all endpoints: {0}")]
    Unavailable(String),

    #[error("oracle request timed out after {0:?}")]
    Timeout(Duration),

    #[error("oracle returned an empty response")]
    EmptyResponse,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid(var: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            var: var.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
