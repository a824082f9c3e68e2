pub mod article;
pub mod config;
pub mod curation;
pub mod environment;
pub mod error;
pub mod logging;
pub mod normalizer;
pub mod oracle;
pub mod persona;
pub mod pool;
pub mod prompt;
pub mod rss;

#[cfg(test)]
mod test_support;

pub use article::{Article, Domain};
pub use config::CuratorConfig;
pub use curation::{CuratedItem, CurationEngine, CurationMode, CurationResult};
pub use error::{ConfigError, CurationError, OracleError};
pub use persona::Persona;
pub use pool::{PoolBuild, PoolBuilder};

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_LLM_REQUEST: &str = "llm_request";
pub const TARGET_CURATION: &str = "curation";
