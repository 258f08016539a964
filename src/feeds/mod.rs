//! Feed Builder
//!
//! Pulls public RSS/Atom feeds and writes the dashboard payload:
//! - one breach/hack feed for the headline list
//! - a set of cyber security and OSINT feeds for the news list

mod builder;
mod client;
mod parse;

pub use builder::{build_payload, dedupe_by_url, summarize, write_payload, FeedBuilder, FeedSources};
pub use client::{normalize, FeedClient, DEFAULT_USER_AGENT};
pub use parse::{parse_feed, ParsedEntry, ParsedFeed};

use thiserror::Error;

/// Errors that can occur while fetching or writing feeds
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Feed parse error: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for feed operations
pub type FeedResult<T> = Result<T, FeedError>;
