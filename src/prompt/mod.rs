mod common;
mod relevance;
mod selection;

pub use common::*;
pub use relevance::relevance_prompt;
pub use selection::{selection_prompt, MAX_SELECTION_CANDIDATES};
