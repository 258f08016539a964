//! # OSINT Board
//!
//! A security news dashboard: builds a digest of breach headlines and
//! cyber/OSINT news from public RSS/Atom feeds, and serves a panel that
//! re-renders that digest on a fixed interval.
//!
//! ## Modules
//!
//! - [`feeds`]: Fetch and parse feeds, write `data.json`
//! - [`payload`]: The `data.json` document, read leniently
//! - [`render`]: Project a payload into the panel's containers
//! - [`refresh`]: Periodic fetch-then-render loop
//! - [`api`]: HTTP server for the panel and the payload
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use osint_board::refresh::{Dashboard, FileSource};
//! use osint_board::render::Renderer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dashboard = Dashboard::new(
//!         Box::new(FileSource::new("dashboard/data.json")),
//!         Renderer::default(),
//!     );
//!
//!     dashboard.refresh().await?;
//!
//!     let panel = dashboard.panel().await;
//!     println!("{}", panel.to_page("OSINT Board", &["#breaches", "#rss"], None));
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod feeds;
pub mod payload;
pub mod refresh;
pub mod render;

#[cfg(test)]
mod test_util;

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, DashboardConfig, FeedsConfig, LoggingConfig};

pub use feeds::{FeedBuilder, FeedClient, FeedError, FeedSources};

pub use payload::{BreachItem, FeedItem, GeneratedAt, Payload, PayloadDocument, PayloadError};

pub use refresh::{Dashboard, DataSource, FileSource, HttpSource, RefreshError, RefreshStats};

pub use render::{Card, Container, Layout, Panel, RenderError, Renderer};
