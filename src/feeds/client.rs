//! Feed HTTP client

use super::parse::{parse_feed, ParsedFeed};
use super::{FeedError, FeedResult};
use crate::payload::FeedItem;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("osint-board/", env!("CARGO_PKG_VERSION"));

const FEED_ACCEPT: &str = "application/rss+xml, application/atom+xml, */*";

/// Fetches and normalises feeds
#[derive(Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new(user_agent: &str, timeout: Duration) -> FeedResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(FEED_ACCEPT));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    /// Download and parse one feed
    pub async fn fetch_parsed(&self, url: &str) -> FeedResult<ParsedFeed> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        parse_feed(&body)
    }

    /// Fetch a feed and normalise its first `limit` entries
    pub async fn try_fetch_feed(&self, url: &str, limit: usize) -> FeedResult<Vec<FeedItem>> {
        let parsed = self.fetch_parsed(url).await?;
        Ok(normalize(parsed, url, limit))
    }

    /// Like [`try_fetch_feed`](Self::try_fetch_feed), but a broken feed only
    /// costs its own items
    pub async fn fetch_feed(&self, url: &str, limit: usize) -> Vec<FeedItem> {
        match self.try_fetch_feed(url, limit).await {
            Ok(items) => {
                tracing::debug!(%url, items = items.len(), "Fetched feed");
                items
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "Skipping feed");
                Vec::new()
            }
        }
    }
}

/// Turn parsed entries into payload items, tagged with the feed's title
pub fn normalize(parsed: ParsedFeed, url: &str, limit: usize) -> Vec<FeedItem> {
    let source = parsed.title.unwrap_or_else(|| url.to_string());

    parsed
        .entries
        .into_iter()
        .take(limit)
        .map(|entry| FeedItem {
            published: entry.published_at().map(|at| at.to_rfc3339()),
            title: entry.title,
            url: entry.link,
            source: Some(source.clone()),
        })
        .collect()
}
