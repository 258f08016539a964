//! OSINT Board server
//!
//! Run with: cargo run --bin osint-board
//!
//! Loads configuration (see `osint-board-cli config`), optionally keeps
//! `data.json` rebuilt from the configured feeds, runs the dashboard
//! refresh loop, and serves the panel over HTTP.

use osint_board::api::{serve, AppState};
use osint_board::config::Config;
use osint_board::feeds::{FeedBuilder, FeedClient};
use osint_board::refresh::{source_for, Dashboard};
use osint_board::render::Renderer;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::var("OSINT_BOARD_CONFIG") {
        Ok(path) => Config::load_with_env(Path::new(&path))?,
        Err(_) => Config::load_default(),
    };
    config.logging.init();

    tracing::info!("Starting OSINT Board v{}", env!("CARGO_PKG_VERSION"));

    // Keep data.json fresh when this process owns the build
    let builder_handle = match config.feeds.rebuild_interval() {
        Some(interval) => {
            let client = FeedClient::new(&config.feeds.user_agent, config.feeds.timeout())?;
            let builder = Arc::new(FeedBuilder::new(
                client,
                config.feeds.sources(),
                &config.api.data_path,
            ));
            // Builds first when data.json is missing so the first refresh has data
            Some(builder.start(interval).await)
        }
        None => {
            tracing::info!(
                "Feed rebuild disabled, expecting {} to be produced externally",
                config.api.data_path
            );
            None
        }
    };

    let source = source_for(&config.dashboard_source(), config.dashboard.fetch_timeout())?;
    let renderer = Renderer::new(config.dashboard.layout()).max_items(config.dashboard.max_items);
    let dashboard = Arc::new(
        Dashboard::new(source, renderer).with_interval(config.dashboard.refresh_interval()),
    );
    let refresh_handle = Arc::clone(&dashboard).start();

    let state = AppState::new(dashboard, config.api.clone()).with_title(&config.dashboard.title);
    serve(state, &config.api).await?;

    refresh_handle.abort();
    if let Some(handle) = builder_handle {
        handle.abort();
    }

    tracing::info!("OSINT Board stopped");
    Ok(())
}
