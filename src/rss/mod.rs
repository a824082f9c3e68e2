//! RSS feed transport: fetching, decoding and parsing of configured feeds.

mod client;
mod fetcher;
mod parser;
mod types;
mod util;

pub use self::client::{create_http_client, fetch_with_fallback};
pub use self::fetcher::{FeedFetcher, HttpFeedFetcher};
pub use self::parser::parse_feed;
pub use self::types::*;
pub use self::util::{cleanup_xml, decode_body, is_valid_url};
