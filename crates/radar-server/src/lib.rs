//! HTTP server for the Thoughts Radar.
//!
//! Mounts the JSON API from [`radar_api`] under `/api`, wraps it in request
//! tracing and a per-request timeout, and seeds bands from a TOML file.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::{Json, Router, routing::get};
use radar_api::Clock;
use radar_core::{band::Band, store::RadarStore};
use radar_store_sqlite::SqliteStore;
use serde::Deserialize;
use thiserror::Error;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `RADAR_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_store_path")]
  pub store_path:           PathBuf,
  /// TOML file of `[[bands]]` upserted at startup.
  #[serde(default)]
  pub bands_file:           Option<PathBuf>,
  #[serde(default = "default_timeout")]
  pub request_timeout_secs: u64,
  /// Offset from UTC, in whole hours, of the day `/items/today` serves.
  #[serde(default)]
  pub utc_offset_hours:     i32,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("radar.db") }
fn default_timeout() -> u64 { 10 }

impl ServerConfig {
  pub fn clock(&self) -> Result<Clock, Error> {
    Clock::with_offset_hours(self.utc_offset_hours)
      .ok_or(Error::BadOffset(self.utc_offset_hours))
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs.max(1))
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("utc_offset_hours must be within ±23, got {0}")]
  BadOffset(i32),

  #[error("failed to read bands file {path:?}: {source}")]
  BandsRead {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse bands file {path:?}: {source}")]
  BandsParse {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("failed to seed band {freq_id}: {source}")]
  Seed {
    freq_id: String,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("failed to create store directory {path:?}: {source}")]
  StoreDir {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to open store at {path:?}: {source}")]
  StoreOpen {
    path:   PathBuf,
    #[source]
    source: radar_store_sqlite::Error,
  },
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Open the SQLite store at `path`, creating missing parent directories.
pub async fn open_store(path: &Path) -> Result<SqliteStore, Error> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .map_err(|source| Error::StoreDir { path: parent.to_path_buf(), source })?;
  }
  SqliteStore::open(path)
    .await
    .map_err(|source| Error::StoreOpen { path: path.to_path_buf(), source })
}

// ─── Band seeding ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandsFile {
  #[serde(default)]
  pub bands: Vec<Band>,
}

pub fn read_bands(path: &Path) -> Result<Vec<Band>, Error> {
  let text = std::fs::read_to_string(path)
    .map_err(|source| Error::BandsRead { path: path.to_path_buf(), source })?;
  let file: BandsFile = toml::from_str(&text)
    .map_err(|source| Error::BandsParse { path: path.to_path_buf(), source })?;
  Ok(file.bands)
}

/// Upsert every band in `bands`. Re-running with the same file is a no-op.
pub async fn seed_bands<S: RadarStore>(store: &S, bands: Vec<Band>) -> Result<usize, Error> {
  let count = bands.len();
  for band in bands {
    let freq_id = band.freq_id.clone();
    store
      .upsert_band(band)
      .await
      .map_err(|e| Error::Seed { freq_id, source: Box::new(e) })?;
  }
  tracing::info!(count, "seeded bands");
  Ok(count)
}

// ─── Router ──────────────────────────────────────────────────────────────────

async fn health() -> Json<serde_json::Value> { Json(serde_json::json!({ "status": "ok" })) }

/// Build the full application router.
pub fn router<S>(store: Arc<S>, cfg: &ServerConfig) -> Result<Router, Error>
where
  S: RadarStore + 'static,
{
  let clock = cfg.clock()?;
  Ok(
    Router::new()
      .route("/health", get(health))
      .nest("/api", radar_api::api_router(store, clock))
      .layer(TimeoutLayer::new(cfg.request_timeout()))
      .layer(TraceLayer::new_for_http()),
  )
}

#[cfg(test)]
mod tests {
  use axum::{body::Body, http::{Request, StatusCode}};
  use tower::ServiceExt as _;

  use super::*;

  fn defaults() -> ServerConfig {
    config::Config::builder()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn config_has_defaults() {
    let cfg = defaults();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
    assert!(cfg.bands_file.is_none());
    assert!(cfg.clock().is_ok());
  }

  #[test]
  fn out_of_range_offset_is_rejected() {
    let cfg = ServerConfig { utc_offset_hours: 30, ..defaults() };
    assert!(matches!(cfg.clock(), Err(Error::BadOffset(30))));
  }

  #[test]
  fn bands_file_parses() {
    let file: BandsFile = toml::from_str(
      r#"
        [[bands]]
        freq_id  = "T1"
        question = "Will machines think?"
        side_a   = "Yes"
        side_b   = "No"
        domain   = "tech"
      "#,
    )
    .unwrap();
    assert_eq!(file.bands.len(), 1);
    assert_eq!(file.bands[0].freq_id, "T1");
  }

  #[tokio::test]
  async fn store_opens_under_missing_directories() {
    let root = std::env::temp_dir().join(format!(
      "radar-server-{}-{}",
      std::process::id(),
      std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
    ));
    let path = root.join("data").join("radar").join("radar.db");
    assert!(!root.exists());

    let store = open_store(&path).await.unwrap();
    assert!(path.exists());
    store.close().await.unwrap();

    std::fs::remove_dir_all(root).ok();
  }

  #[tokio::test]
  async fn seeded_bands_are_served() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let bands = vec![Band {
      freq_id:  "Φ1".into(),
      question: "Is there free will?".into(),
      side_a:   "Yes".into(),
      side_b:   "No".into(),
      domain:   radar_core::band::Domain::Philosophy,
    }];
    assert_eq!(seed_bands(store.as_ref(), bands.clone()).await.unwrap(), 1);
    assert_eq!(seed_bands(store.as_ref(), bands).await.unwrap(), 1);

    let app = router(store, &defaults()).unwrap();
    let res = app
      .oneshot(Request::get("/api/bands").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let bands: Vec<Band> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(bands.len(), 1);
  }
}
