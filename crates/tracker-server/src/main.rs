//! Compliance tracker server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, starts the archival scheduler, and serves the HTTP API.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracker_core::{memory::MemoryStore, service::Tracker, store::TableStore};
use tracker_server::{ServerConfig, app, notify, scheduler};
use tracker_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Non-compliance tracker server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Run one archival pass, print its report, and exit.
  #[arg(long)]
  archive_once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  match server_cfg.store_path() {
    Some(path) => {
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      tracing::info!(?path, "opened sqlite store");
      run(store, server_cfg, cli.archive_once).await
    }
    None => {
      tracing::warn!("no store_path configured; tables live in memory only");
      run(MemoryStore::new(), server_cfg, cli.archive_once).await
    }
  }
}

async fn run<S: TableStore + 'static>(
  store: S,
  server_cfg: ServerConfig,
  archive_once: bool,
) -> anyhow::Result<()> {
  let mut tracker = Tracker::new(Arc::new(store), server_cfg.tracker.clone());
  if let Some(notifier) =
    notify::from_config(&server_cfg.debug).context("failed to build notifier")?
  {
    tracker = tracker.with_notifier(notifier);
  }

  if archive_once {
    let report = tracker.run_archival().await.context("archival pass failed")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  if let Some(every) = server_cfg.archive_interval() {
    scheduler::spawn_archival(tracker.clone(), every);
  }

  let address = server_cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app(tracker)).await.context("server error")?;

  Ok(())
}
