//! Payload builder
//!
//! Fetches every configured feed, merges the news feeds, and writes the
//! result as the dashboard's `data.json`.

use super::client::FeedClient;
use super::FeedResult;
use crate::payload::{BreachItem, FeedItem, PayloadDocument};
use chrono::Utc;
use futures_util::future::join_all;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Which feeds to pull and how much of each to keep
#[derive(Debug, Clone)]
pub struct FeedSources {
    /// Single feed focused on breaches against organisations
    pub breach_feed: String,
    /// Cyber security and OSINT news feeds, in display order
    pub news_feeds: Vec<String>,
    pub breach_limit: usize,
    pub news_limit: usize,
}

impl Default for FeedSources {
    fn default() -> Self {
        Self {
            breach_feed: "https://databreaches.net/feed/".to_string(),
            news_feeds: [
                "https://www.cisa.gov/news-events/cybersecurity-advisories.xml",
                "https://www.cisa.gov/news-events/alerts.xml",
                "https://www.ncsc.gov.uk/api/1/services/v1/all-rss-feed",
                "https://krebsonsecurity.com/feed/",
                "https://www.bleepingcomputer.com/feed/",
                "https://thehackernews.com/feeds/posts/default",
                "https://www.bellingcat.com/feed/",
                "https://osintcurio.us/feed/",
                "https://sector035.nl/feed",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            breach_limit: 30,
            news_limit: 20,
        }
    }
}

/// Keep the first item for each URL; items without a URL are dropped
pub fn dedupe_by_url(items: Vec<FeedItem>) -> Vec<FeedItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let url = item.url.as_deref().map(str::trim).unwrap_or("");
            !url.is_empty() && seen.insert(url.to_string())
        })
        .collect()
}

/// One-line description of what was collected
pub fn summarize(breaches: &[BreachItem], news: &[FeedItem]) -> String {
    let sources: HashSet<&str> = news.iter().filter_map(|item| item.source.as_deref()).collect();
    format!(
        "{} breach/leak headline{} and {} security news item{} from {} source{}.",
        breaches.len(),
        plural(breaches.len()),
        news.len(),
        plural(news.len()),
        sources.len(),
        plural(sources.len()),
    )
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Fetch every feed and assemble the payload
///
/// News feeds are fetched concurrently but merged in configured order.
pub async fn build_payload(client: &FeedClient, sources: &FeedSources) -> PayloadDocument {
    let breaches: Vec<BreachItem> = client
        .fetch_feed(&sources.breach_feed, sources.breach_limit)
        .await
        .into_iter()
        .map(BreachItem::from)
        .collect();

    let fetches = sources
        .news_feeds
        .iter()
        .map(|url| client.fetch_feed(url, sources.news_limit));
    let news = dedupe_by_url(join_all(fetches).await.into_iter().flatten().collect());

    let summary = summarize(&breaches, &news);
    PayloadDocument::new(Utc::now(), summary, breaches, news)
}

/// Write the payload as pretty JSON, replacing the file atomically
pub async fn write_payload(path: &Path, document: &PayloadDocument) -> FeedResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_vec_pretty(document)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &json).await?;
    tokio::fs::rename(&tmp, path).await?;

    tracing::info!(
        path = %path.display(),
        hacks = document.breaches.len(),
        news = document.rss.len(),
        generated_at = %document.generated_at,
        "Wrote dashboard payload"
    );
    Ok(())
}

/// Builds and writes the payload, once or on a schedule
pub struct FeedBuilder {
    client: FeedClient,
    sources: FeedSources,
    output: PathBuf,
}

impl FeedBuilder {
    pub fn new(client: FeedClient, sources: FeedSources, output: impl Into<PathBuf>) -> Self {
        Self {
            client,
            sources,
            output: output.into(),
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Build the payload and write it to the output path
    pub async fn run(&self) -> FeedResult<PayloadDocument> {
        let document = build_payload(&self.client, &self.sources).await;
        write_payload(&self.output, &document).await?;
        Ok(document)
    }

    /// Rebuild on a fixed interval, starting immediately
    pub fn start_background(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        self.spawn_loop(tokio::time::Instant::now(), interval)
    }

    /// Like [`start_background`](Self::start_background), but when the
    /// output does not exist yet the first build completes before this
    /// returns, so readers started afterwards find a payload
    pub async fn start(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        if tokio::fs::try_exists(&self.output).await.unwrap_or(false) {
            return self.start_background(interval);
        }

        if let Err(e) = self.run().await {
            tracing::error!(error = %e, "Initial feed build failed");
        }
        self.spawn_loop(tokio::time::Instant::now() + interval, interval)
    }

    fn spawn_loop(
        self: Arc<Self>,
        first: tokio::time::Instant,
        interval: Duration,
    ) -> tokio::task::JoinHandle<()> {
        tracing::info!(
            interval_secs = interval.as_secs(),
            output = %self.output.display(),
            "Starting background feed builder"
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if let Err(e) = self.run().await {
                    tracing::error!(error = %e, "Feed build failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Payload;
    use axum::{http::header, routing::get, Router};

    fn item(url: &str, title: &str) -> FeedItem {
        FeedItem {
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            source: Some("src".to_string()),
            published: None,
        }
    }

    #[test]
    fn test_dedupe_by_url() {
        let mut no_url = item("", "no url");
        no_url.url = None;

        let items = vec![
            item("https://a", "first"),
            item("https://b", "b"),
            item(" https://a ", "second"),
            item("   ", "blank"),
            no_url,
        ];
        let deduped = dedupe_by_url(items);
        let titles: Vec<_> = deduped.iter().filter_map(|i| i.title.as_deref()).collect();
        assert_eq!(titles, vec!["first", "b"]);
    }

    #[test]
    fn test_summarize() {
        let breaches = vec![BreachItem::default()];
        let news = vec![item("https://a", "a"), item("https://b", "b")];
        assert_eq!(
            summarize(&breaches, &news),
            "1 breach/leak headline and 2 security news items from 1 source."
        );
        assert_eq!(
            summarize(&[], &[]),
            "0 breach/leak headlines and 0 security news items from 0 sources."
        );
    }

    const BREACH_FEED: &str = r#"<rss version="2.0"><channel><title>Breaches</title>
        <item><title>Acme leak</title><link>https://b/1</link><pubDate>Mon, 01 Jan 2024 00:00:00 +0000</pubDate></item>
        </channel></rss>"#;

    const NEWS_A: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>A</title>
        <entry><title>one</title><link href="https://n/1"/><updated>2024-01-01T00:00:00Z</updated></entry>
        <entry><title>two</title><link href="https://n/2"/></entry>
        </feed>"#;

    const NEWS_B: &str = r#"<rss version="2.0"><channel><title>B</title>
        <item><title>dup</title><link>https://n/2</link></item>
        <item><title>three</title><link>https://n/3</link></item>
        </channel></rss>"#;

    async fn serve_feeds() -> FeedSources {
        let xml = |body: &'static str| move || async move { ([(header::CONTENT_TYPE, "application/rss+xml")], body) };
        let router = Router::new()
            .route("/breaches", get(xml(BREACH_FEED)))
            .route("/a", get(xml(NEWS_A)))
            .route("/b", get(xml(NEWS_B)))
            .route("/broken", get(|| async { "<html>not a feed</html>" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        FeedSources {
            breach_feed: format!("{}/breaches", base),
            news_feeds: vec![
                format!("{}/a", base),
                format!("{}/broken", base),
                format!("{}/b", base),
            ],
            breach_limit: 30,
            news_limit: 20,
        }
    }

    #[tokio::test]
    async fn test_build_and_write() {
        let sources = serve_feeds().await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("dashboard").join("data.json");
        let client = FeedClient::new("test-agent", Duration::from_secs(5)).unwrap();
        let builder = FeedBuilder::new(client, sources, &output);

        let document = builder.run().await.unwrap();
        assert_eq!(document.breaches.len(), 1);
        let titles: Vec<_> = document.rss.iter().filter_map(|i| i.title.as_deref()).collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
        assert!(document.generated_at.ends_with('Z'));

        let written = std::fs::read_to_string(&output).unwrap();
        let payload = Payload::from_json(&written).unwrap();
        assert_eq!(payload.breaches()[0].headline(), Some("Acme leak"));
        assert_eq!(payload.breaches()[0].source.as_deref(), Some("Breaches"));
        assert_eq!(payload.rss()[2].source.as_deref(), Some("B"));
        assert!(payload.summary.unwrap().starts_with("1 breach/leak headline and 3"));
        assert!(!dir.path().join("dashboard").join("data.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_start_builds_missing_output_first() {
        let sources = serve_feeds().await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("data.json");
        let client = FeedClient::new("test-agent", Duration::from_secs(5)).unwrap();
        let builder = Arc::new(FeedBuilder::new(client, sources, &output));

        let handle = builder.start(Duration::from_secs(3600)).await;
        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(Payload::from_json(&written).unwrap().rss().len(), 3);

        handle.abort();
    }
}
