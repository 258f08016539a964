//! Dashboard payload
//!
//! The JSON document (`data.json`) that the feed builder writes and the
//! dashboard panel reads. Reading is deliberately lenient: every field is
//! optional, and malformed values degrade to "absent" instead of failing.

mod types;

pub use types::{BreachItem, FeedItem, GeneratedAt, Payload, PayloadDocument};

use thiserror::Error;

/// Errors raised while turning raw JSON into a [`Payload`]
#[derive(Error, Debug)]
pub enum PayloadError {
    /// The body was not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The body was JSON, but not an object at the top level
    #[error("Expected a JSON object at the top level, found {0}")]
    NotAnObject(&'static str),
}

/// Result type for payload parsing
pub type PayloadResult<T> = Result<T, PayloadError>;
