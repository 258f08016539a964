//! OSINT Board CLI
//!
//! Command-line interface for OSINT Board operations:
//! - Build data.json from the configured feeds
//! - Render a payload to a static HTML page
//! - Check a running server
//! - Generate a config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use osint_board::config::{generate_default_config, Config};
use osint_board::feeds::{FeedBuilder, FeedClient};
use osint_board::refresh::{source_for, Dashboard};
use osint_board::render::Renderer;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "osint-board")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Security news dashboard: feed builder and panel renderer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the configured feeds and write data.json
    Build {
        /// Output path (default: api.data_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a payload once and write the page
    Render {
        /// Payload URL or file (default: dashboard.source)
        #[arg(short, long)]
        source: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the status of a running server
    Status {
        /// Server URL
        #[arg(long, default_value = "http://localhost:8090")]
        url: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::from_env(),
    };
    config.logging.init();

    match cli.command {
        Commands::Build { output } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&config.api.data_path));
            let client = FeedClient::new(&config.feeds.user_agent, config.feeds.timeout())?;
            let builder = FeedBuilder::new(client, config.feeds.sources(), &output);

            let document = builder.run().await?;
            println!(
                "Wrote {} with {} hacks and {} cyber/OSINT items at {}.",
                output.display(),
                document.breaches.len(),
                document.rss.len(),
                document.generated_at
            );
        }

        Commands::Render { source, output } => {
            let location = source.unwrap_or_else(|| config.dashboard_source());
            let renderer =
                Renderer::new(config.dashboard.layout()).max_items(config.dashboard.max_items);
            let dashboard = Dashboard::new(
                source_for(&location, config.dashboard.fetch_timeout())?,
                renderer,
            );

            dashboard
                .refresh()
                .await
                .with_context(|| format!("Failed to render {}", location))?;

            let layout = dashboard.renderer().layout();
            let page = dashboard.panel().await.to_page(
                &config.dashboard.title,
                &[
                    layout.timestamp.as_str(),
                    layout.breaches.as_str(),
                    layout.rss.as_str(),
                    layout.summary.as_str(),
                ],
                None,
            );

            match output {
                Some(path) => {
                    std::fs::write(&path, page)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", page),
            }
        }

        Commands::Status { url } => {
            let response = reqwest::Client::new()
                .get(format!("{}/health", url.trim_end_matches('/')))
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("OSINT Board v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("Server status: {}", health["status"].as_str().unwrap_or("unknown"));

                    let refresh = &health["refresh"];
                    println!();
                    println!("Refresh:");
                    println!("  Attempts:  {}", refresh["attempts"]);
                    println!("  Successes: {}", refresh["successes"]);
                    println!("  Failures:  {}", refresh["failures"]);
                    if let Some(at) = refresh["last_success"].as_str() {
                        println!("  Last success: {}", at);
                    }
                    if let Some(error) = refresh["last_error"].as_str() {
                        println!("  Last error: {}", error);
                    }

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("Server returned {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot reach {}: {}", url, e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn format_duration(seconds: u64) -> String {
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m {}s", minutes, seconds % 60)
    }
}
