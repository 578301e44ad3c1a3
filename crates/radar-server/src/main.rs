//! `radar-server`: serve the Thoughts Radar JSON API.
//!
//! Settings come from a TOML file (`--config`, default `config.toml`) with
//! `RADAR_*` environment variables layered on top. The process stops on
//! ctrl-c after in-flight requests finish, then closes the store.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use radar_server::ServerConfig;
use radar_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Thoughts Radar API server")]
struct Cli {
  /// TOML configuration file; missing files fall back to defaults.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Override `store_path` from the configuration.
  #[arg(long)]
  store: Option<PathBuf>,

  /// Skip seeding bands even when `bands_file` is set.
  #[arg(long)]
  no_seed: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
  let mut cfg: ServerConfig = config::Config::builder()
    .add_source(config::File::from(cli.config.as_path()).required(false))
    .add_source(config::Environment::with_prefix("RADAR"))
    .build()
    .and_then(config::Config::try_deserialize)
    .with_context(|| format!("invalid configuration in {:?}", cli.config))?;

  if let Some(store) = &cli.store {
    cfg.store_path = store.clone();
  }
  cfg.store_path = home_relative(&cfg.store_path);
  cfg.bands_file = cfg.bands_file.as_deref().map(home_relative);
  Ok(cfg)
}

/// `~/x` → `$HOME/x`; anything else is returned unchanged.
fn home_relative(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), dirs::home_dir()) {
    (Ok(rest), Some(home)) => home.join(rest),
    _ => path.to_path_buf(),
  }
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
  let cfg = load_config(&cli)?;

  let store = radar_server::open_store(&cfg.store_path).await?;
  tracing::info!(path = ?cfg.store_path, "store ready");

  match (&cfg.bands_file, cli.no_seed) {
    (Some(path), false) => {
      let bands = radar_server::read_bands(path)?;
      let seeded = radar_server::seed_bands(&store, bands).await?;
      tracing::info!(count = seeded, file = ?path, "bands seeded");
    }
    (Some(_), true) => tracing::info!("band seeding skipped"),
    (None, _) => {}
  }

  let store = Arc::new(store);
  let app = radar_server::router(Arc::clone(&store), &cfg)?;

  let address = format!("{}:{}", cfg.host, cfg.port);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("cannot bind {address}"))?;
  tracing::info!("Listening on http://{address}");

  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
      }
      tracing::info!("shutdown requested");
    })
    .await
    .context("server error")?;

  SqliteStore::clone(&store)
    .close()
    .await
    .context("failed to close store")?;
  tracing::info!("store closed");
  Ok(())
}
