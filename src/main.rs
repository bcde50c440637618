use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use video_summarizer::{ApiServer, AppState, Config, KeepAlive};

#[derive(Parser, Debug)]
#[command(name = "video-summarizer", version, about = "Summarize videos from their transcripts")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides configuration)
    #[arg(short, long)]
    port: Option<u16>,

    /// Tracing filter, used when RUST_LOG is unset
    #[arg(
        long,
        env = "SUMMARIZER_LOG_LEVEL",
        default_value = "video_summarizer=info,tower_http=info,warn"
    )]
    log_level: String,

    /// Disable the keep-alive self-ping
    #[arg(long)]
    no_keep_alive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?.with_env_overrides(),
        None => Config::load()?,
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.no_keep_alive {
        config.keep_alive.target_url = None;
    }

    config.validate().context("invalid configuration")?;
    info!("{}", config.summary());

    let keep_alive_config = config.keep_alive.clone();
    let state = AppState::from_config(config)?;
    let keep_alive = KeepAlive::start(&keep_alive_config)?;

    ApiServer::new(state).run(shutdown_signal()).await?;

    if let Some(handle) = keep_alive {
        handle.shutdown().await;
    }
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
