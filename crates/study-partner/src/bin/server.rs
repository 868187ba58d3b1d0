//! Study partner server binary
//!
//! Run with: cargo run -p study-partner --bin study-partner-server -- --config study.toml

use clap::Parser;
use std::path::PathBuf;
use study_partner::{config::StudyConfig, server::StudyServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "study-partner-server", version, about = "Chat with your study materials")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "study_partner=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => StudyConfig::from_file(path)?,
        None => StudyConfig::default(),
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Model: {}", config.llm.model);
    tracing::info!("  - Endpoint: {}", config.llm.endpoint);
    tracing::info!(
        "  - Defaults: temperature {:.1}, chunk size {}, relevant chunks {}",
        config.settings.temperature,
        config.settings.chunk_size,
        config.settings.top_k
    );
    tracing::info!("  - Chunk overlap: {}", config.chunking.chunk_overlap);

    let server = StudyServer::new(config)?;

    println!("\nServer starting...");
    println!("  App: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
