//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::config::ApiConfig;
use crate::refresh::Dashboard;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// The dashboard panel and its refresh loop
    pub dashboard: Arc<Dashboard>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Page title
    pub title: String,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(dashboard: Arc<Dashboard>, config: ApiConfig) -> Self {
        Self {
            dashboard,
            config: Arc::new(config),
            title: "OSINT Board".to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Payload file served at `/data.json`
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.config.data_path)
    }
}
