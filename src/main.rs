//! opslog demo.
//!
//! Installs a logger from a TOML config (or a debug-level default), writes a
//! few lines through the free functions and a derived handle, and with
//! `--watch` keeps applying level changes from the config file until Ctrl-C.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use opslog::config::{apply_reloads, load_config, ConfigWatcher};
use opslog::{fields, LogConfig};

#[derive(Parser)]
#[command(name = "opslog-demo")]
#[command(about = "Structured logging facade demo", long_about = None)]
struct Cli {
    /// TOML logging config; defaults to debug level, human encoding.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// System name attached to every line.
    #[arg(short, long, default_value = "OpsLink")]
    name: String,

    /// Keep running and reload levels when the config file changes.
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Diagnostics of the demo itself (watcher events) go through tracing.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opslog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LogConfig::with_level("debug"),
    };

    if let Err(e) = opslog::init_log_config(&config, &cli.name) {
        tracing::error!("Failed to build logger: {}. Logging is disabled.", e);
    }

    opslog::infow("123", &[]);
    opslog::warnw("warn", None, &fields!["k1" => "v1"]);
    opslog::debugw("debug line", &fields!["n" => 2]);

    let participant = opslog::get_logger().with_participant("1", "2", true);
    participant.info("participant attached", &[]);
    participant
        .with_component("media")
        .with_item_sampler()
        .info("sampled per item", &[]);

    let (Some(path), true) = (cli.config, cli.watch) else {
        return Ok(());
    };

    let (watcher, updates) = ConfigWatcher::new(&path);
    let _watcher = watcher.run()?;
    let registry = opslog::get_logger().registry().clone();

    tokio::select! {
        _ = apply_reloads(updates, registry) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
