//! Data Sources
//!
//! Where the dashboard reads its payload from: the builder's `data.json`
//! over HTTP, or straight off disk.

use super::RefreshError;
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

/// Something that can hand back the raw payload text
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human-readable location, used in logs
    fn describe(&self) -> String;

    /// Fetch the current document body
    async fn fetch(&self) -> Result<String, RefreshError>;
}

/// Fetches the payload over HTTP, bypassing every cache on the way
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RefreshError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Append a millisecond cache-buster to `url`
pub fn cache_busted(url: &str, millis: i64) -> String {
    let (base, fragment) = match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    };
    let separator = if base.contains('?') { '&' } else { '?' };
    let mut busted = format!("{}{}x={}", base, separator, millis);
    if let Some(fragment) = fragment {
        busted.push('#');
        busted.push_str(fragment);
    }
    busted
}

#[async_trait]
impl DataSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<String, RefreshError> {
        let url = cache_busted(&self.url, chrono::Utc::now().timestamp_millis());
        tracing::debug!(%url, "Fetching payload");

        let response = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::Status(status));
        }

        Ok(response.text().await?)
    }
}

/// Reads the payload from a local file
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String, RefreshError> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

/// Pick a source for a configured location: URLs go over HTTP, anything
/// else is treated as a path
pub fn source_for(location: &str, timeout: Duration) -> Result<Box<dyn DataSource>, RefreshError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location, timeout)?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}
