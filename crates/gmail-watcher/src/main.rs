mod config;
mod gmail_client;
mod watcher;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use watcher_core::{Emitter, NotifyHook, SeenSet, WatcherRuntime};

use crate::config::Config;
use crate::gmail_client::GmailClient;
use crate::watcher::GmailWatcher;

#[derive(Parser)]
#[command(name = "gmail-watcher")]
#[command(about = "Materialize new unread important Gmail messages as vault action files")]
struct Cli {
    /// Path to a TOML config file. Flags below override its values.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Vault root directory; action files land in `<vault>/Inbox`.
    #[arg(long, env = "WATCHER_VAULT_DIR")]
    vault: Option<PathBuf>,

    /// Path to the authorized-user Gmail credentials JSON file.
    #[arg(long, env = "GMAIL_CREDENTIALS_PATH")]
    credentials: Option<PathBuf>,

    /// Seconds between poll cycles.
    #[arg(long)]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gmail_watcher=info,watcher_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    tracing::info!("Starting Gmail watcher (vault: {})", config.vault_dir.display());

    let client = GmailClient::from_credentials_file(&config.credentials_path)
        .await
        .context("Failed to initialize Gmail client")?;

    let emitter = Emitter::new(&config.vault_dir)?;
    let seen = SeenSet::load(
        config.vault_dir.join(".watchers/gmail_seen.json"),
        config.seen_capacity,
    )?;

    let watcher = GmailWatcher::new(client, config.query.clone(), config.max_results);
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
            let credentials = cli
                .credentials
                .clone()
                .context("--credentials (or a config file) is required")?;
            Config::with_paths(vault, credentials)
        }
    };

    if let Some(vault) = &cli.vault {
        config.vault_dir = vault.clone();
    }
    if let Some(credentials) = &cli.credentials {
        config.credentials_path = credentials.clone();
    }
    if let Some(interval) = cli.interval {
        config.check_interval_secs = interval;
    }

    Ok(config)
}
