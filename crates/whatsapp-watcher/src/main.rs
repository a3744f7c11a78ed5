mod config;
mod devtools;
mod scraper;
mod watcher;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use watcher_core::{Emitter, NotifyHook, SeenSet, WatcherRuntime};

use crate::config::Config;
use crate::watcher::WhatsAppWatcher;

#[derive(Parser)]
#[command(name = "whatsapp-watcher")]
#[command(about = "Materialize new WhatsApp Web messages as vault action files")]
struct Cli {
    /// Path to a TOML config file. Flags below override its values.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Vault root directory; action files land in `<vault>/Inbox`.
    #[arg(long, env = "WATCHER_VAULT_DIR")]
    vault: Option<PathBuf>,

    /// Chrome remote-debugging endpoint of the logged-in session.
    #[arg(long, env = "WHATSAPP_DEVTOOLS_URL")]
    devtools_url: Option<String>,

    /// Seconds between poll cycles.
    #[arg(long)]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whatsapp_watcher=info,watcher_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    tracing::info!(
        "Starting WhatsApp watcher (vault: {}, devtools: {})",
        config.vault_dir.display(),
        config.devtools_url
    );

    let emitter = Emitter::new(&config.vault_dir)?;
    let seen = SeenSet::load(
        config.vault_dir.join(".watchers/whatsapp_seen.json"),
        config.seen_capacity,
    )?;

    let watcher = WhatsAppWatcher::new(config.devtools_url.clone());
    let runtime = WatcherRuntime::new(
        watcher,
        emitter,
        seen,
        Duration::from_secs(config.check_interval_secs.max(1)),
    )
    .with_hook(NotifyHook::new(config.notify_command.clone()));

    runtime
        .run(async {
            signal::ctrl_c().await.ok();
            tracing::info!("Shutdown signal received, stopping...");
        })
        .await;

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => {
            let vault = cli
                .vault
                .clone()
                .context("--vault (or a config file) is required")?;
            Config::with_vault(vault)
        }
    };

    if let Some(vault) = &cli.vault {
        config.vault_dir = vault.clone();
    }
    if let Some(url) = &cli.devtools_url {
        config.devtools_url = url.clone();
    }
    if let Some(interval) = cli.interval {
        config.check_interval_secs = interval;
    }

    Ok(config)
}
