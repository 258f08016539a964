//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::feeds::{FeedSources, DEFAULT_USER_AGENT};
use crate::render::{Layout, DEFAULT_MAX_ITEMS};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub feeds: FeedsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dashboard panel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Where the payload is read from: an http(s) URL or a file path.
    /// Defaults to the file the API serves.
    pub source: Option<String>,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_rss_container")]
    pub rss_container: String,

    #[serde(default = "default_max_items")]
    pub max_items: usize,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_title")]
    pub title: String,
}

fn default_refresh_interval() -> u64 {
    300 // 5 minutes
}

fn default_rss_container() -> String {
    "rss".to_string()
}

fn default_max_items() -> usize {
    DEFAULT_MAX_ITEMS
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_title() -> String {
    "OSINT Board".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: None,
            refresh_interval_secs: default_refresh_interval(),
            rss_container: default_rss_container(),
            max_items: default_max_items(),
            fetch_timeout_secs: default_fetch_timeout(),
            title: default_title(),
        }
    }
}

impl DashboardConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn layout(&self) -> Layout {
        Layout::default().with_rss_container(self.rss_container.clone())
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// The payload file served at `/data.json`
    #[serde(default = "default_data_path")]
    pub data_path: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_data_path() -> String {
    "dashboard/data.json".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_path: default_data_path(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Feed builder configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedsConfig {
    #[serde(default = "default_breach_feed")]
    pub breach_feed: String,

    #[serde(default = "default_news_feeds")]
    pub news_feeds: Vec<String>,

    #[serde(default = "default_breach_limit")]
    pub breach_limit: usize,

    #[serde(default = "default_news_limit")]
    pub news_limit: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_feed_timeout")]
    pub timeout_secs: u64,

    /// Rebuild `data.json` in the server process on this interval.
    /// Unset means the payload is produced elsewhere (e.g. a cron job).
    pub rebuild_interval_minutes: Option<u64>,
}

fn default_breach_feed() -> String {
    FeedSources::default().breach_feed
}

fn default_news_feeds() -> Vec<String> {
    FeedSources::default().news_feeds
}

fn default_breach_limit() -> usize {
    FeedSources::default().breach_limit
}

fn default_news_limit() -> usize {
    FeedSources::default().news_limit
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_feed_timeout() -> u64 {
    20
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            breach_feed: default_breach_feed(),
            news_feeds: default_news_feeds(),
            breach_limit: default_breach_limit(),
            news_limit: default_news_limit(),
            user_agent: default_user_agent(),
            timeout_secs: default_feed_timeout(),
            rebuild_interval_minutes: None,
        }
    }
}

impl FeedsConfig {
    pub fn sources(&self) -> FeedSources {
        FeedSources {
            breach_feed: self.breach_feed.clone(),
            news_feeds: self.news_feeds.clone(),
            breach_limit: self.breach_limit,
            news_limit: self.news_limit,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn rebuild_interval(&self) -> Option<Duration> {
        self.rebuild_interval_minutes
            .filter(|m| *m > 0)
            .map(|m| Duration::from_secs(m * 60))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Install the global tracing subscriber
    ///
    /// `RUST_LOG` wins over the configured level.
    pub fn init(&self) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("osint_board={},tower_http=info", self.level).into()
        });

        let registry = tracing_subscriber::registry().with(filter);
        if self.format == "json" {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        } else {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("osint-board").join("config.toml")),
            Some(PathBuf::from("/etc/osint-board/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Where the dashboard reads its payload from
    pub fn dashboard_source(&self) -> String {
        self.dashboard
            .source
            .clone()
            .unwrap_or_else(|| self.api.data_path.clone())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(source) = var("OSINT_BOARD_SOURCE") {
            self.dashboard.source = Some(source);
        }
        if let Some(secs) = var("OSINT_BOARD_REFRESH_SECS").and_then(|s| s.parse().ok()) {
            self.dashboard.refresh_interval_secs = secs;
        }

        if let Some(host) = var("OSINT_BOARD_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("OSINT_BOARD_PORT").and_then(|s| s.parse().ok()) {
            self.api.port = port;
        }
        if let Some(data_path) = var("OSINT_BOARD_DATA_PATH") {
            self.api.data_path = data_path;
        }

        if let Some(level) = var("OSINT_BOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("OSINT_BOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# OSINT Board Configuration
#
# Environment variables override these settings:
# - OSINT_BOARD_SOURCE
# - OSINT_BOARD_REFRESH_SECS
# - OSINT_BOARD_HOST
# - OSINT_BOARD_PORT
# - OSINT_BOARD_DATA_PATH
# - OSINT_BOARD_LOG_LEVEL
# - OSINT_BOARD_LOG_FORMAT

[dashboard]
# Payload location: http(s) URL or file path (default: api.data_path)
# source = "http://127.0.0.1:8090/data.json"

# Seconds between refresh cycles
refresh_interval_secs = 300

# Id of the news container ("rss" or "rss-feed")
rss_container = "rss"

# Cards per list
max_items = 10

# Timeout for fetching the payload (seconds)
fetch_timeout_secs = 30

# Page title
title = "OSINT Board"

[api]
host = "0.0.0.0"
port = 8090

# Payload file served at /data.json
data_path = "dashboard/data.json"

[feeds]
# Single feed for breaches/hacks against organisations
breach_feed = "https://databreaches.net/feed/"

# Cyber security + OSINT news feeds
news_feeds = [
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

breach_limit = 30
news_limit = 20
timeout_secs = 20

# Rebuild data.json inside the server every N minutes
# rebuild_interval_minutes = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.dashboard.refresh_interval(), Duration::from_secs(300));
        assert_eq!(config.dashboard.max_items, 10);
        assert_eq!(config.api.addr(), "0.0.0.0:8090");
        assert_eq!(config.feeds.news_feeds.len(), 9);
        assert_eq!(config.feeds.rebuild_interval(), None);
        assert_eq!(config.dashboard_source(), "dashboard/data.json");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse(
            r##"
            [dashboard]
            rss_container = "#rss-feed"
            [feeds]
            rebuild_interval_minutes = 15
            "##,
        )
        .unwrap();
        assert_eq!(config.dashboard.layout().rss, "rss-feed");
        assert_eq!(config.feeds.rebuild_interval(), Some(Duration::from_secs(900)));
        assert_eq!(config.feeds.breach_limit, 30);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("OSINT_BOARD_SOURCE", "http://example/data.json"),
            ("OSINT_BOARD_PORT", "9000"),
            ("OSINT_BOARD_REFRESH_SECS", "not a number"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.dashboard_source(), "http://example/data.json");
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.dashboard.refresh_interval_secs, 300);
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nport = 1").unwrap();

        match Config::load(&path) {
            Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
