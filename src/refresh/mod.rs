//! Refresh Loop
//!
//! Fetches the payload, parses it, and renders it into the shared panel.
//! A failed cycle logs one error and leaves the panel as it was; the next
//! tick simply tries again. There is no backoff and no retry in between.

mod source;

pub use source::{cache_busted, source_for, DataSource, FileSource, HttpSource};

use crate::payload::{Payload, PayloadError};
use crate::render::{Panel, RenderError, Renderer};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// Default time between refresh cycles
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Why a refresh cycle failed
#[derive(Error, Debug)]
pub enum RefreshError {
    /// Network or transport failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("Unexpected HTTP status: {0}")]
    Status(reqwest::StatusCode),

    /// Reading a local payload failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The body was not a usable payload
    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    /// The panel is missing a container
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Counters for the refresh loop
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshStats {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Owns the panel and keeps it in step with the data source
pub struct Dashboard {
    source: Box<dyn DataSource>,
    renderer: Renderer,
    panel: RwLock<Panel>,
    stats: RwLock<RefreshStats>,
    interval: Duration,
}

impl Dashboard {
    pub fn new(source: Box<dyn DataSource>, renderer: Renderer) -> Self {
        let panel = renderer.layout().empty_panel();
        Self {
            source,
            renderer,
            panel: RwLock::new(panel),
            stats: RwLock::new(RefreshStats::default()),
            interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    /// Time between cycles, at least one second
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_REFRESH_INTERVAL);
        self
    }

    /// Replace the panel, e.g. to seed it with a custom container set
    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panel = RwLock::new(panel);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// A copy of the current panel
    pub async fn panel(&self) -> Panel {
        self.panel.read().await.clone()
    }

    pub async fn stats(&self) -> RefreshStats {
        self.stats.read().await.clone()
    }

    /// Whether at least one cycle has rendered successfully
    pub async fn is_ready(&self) -> bool {
        self.stats.read().await.successes > 0
    }

    /// Run one fetch-then-render cycle
    ///
    /// Errors are logged here and returned for callers that care; the
    /// panel is only touched on success.
    pub async fn refresh(&self) -> Result<(), RefreshError> {
        self.stats.write().await.attempts += 1;

        match self.fetch_and_render().await {
            Ok(()) => {
                let mut stats = self.stats.write().await;
                stats.successes += 1;
                stats.last_success = Some(Utc::now());
                stats.last_error = None;
                tracing::debug!(source = %self.source.describe(), "Dashboard refreshed");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    source = %self.source.describe(),
                    error = %e,
                    "[refresh] fetching dashboard data failed"
                );
                let mut stats = self.stats.write().await;
                stats.failures += 1;
                stats.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn fetch_and_render(&self) -> Result<(), RefreshError> {
        let body = self.source.fetch().await?;
        let payload = Payload::from_json(&body)?;

        let mut panel = self.panel.write().await;
        self.renderer.render(&mut panel, &payload)?;
        Ok(())
    }

    /// Start the refresh loop
    ///
    /// The first cycle runs immediately, then one per interval for as long
    /// as the task lives. Missed ticks are skipped, not bursted.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tracing::info!(
            source = %self.source.describe(),
            interval_secs = self.interval.as_secs(),
            "Starting dashboard refresh loop"
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                // Already logged; the next tick is the retry
                let _ = self.refresh().await;
            }
        })
    }
}
