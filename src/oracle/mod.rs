//! The relevance oracle: the text-generation seam, its Ollama transport, and
//! the adapter that turns free-text answers into verdicts and selections.

mod adapter;
mod ollama;
mod parse;

use async_trait::async_trait;

use crate::error::OracleError;

pub use self::adapter::{AdapterSettings, RelevanceAdapter, Selection, Verdict};
pub use self::ollama::{EndpointStatus, OllamaEndpoint, OllamaOracle, OracleConfig};
pub use self::parse::{parse_selection_blocks, parse_verdict, RankedPick};

/// A free-text completion service.
#[async_trait]
pub trait TextOracle: Send + Sync {
    fn name(&self) -> String;

    async fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}
