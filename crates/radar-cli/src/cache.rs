//! Last-good-response cache for read commands.
//!
//! Each successful read stores its raw JSON body under a key derived from the
//! request. When the server is unreachable the read falls back to that copy.
//! Writes never go through here.

use std::path::PathBuf;

use serde::de::DeserializeOwned;

use crate::client::{self, ApiClient, ClientError};

pub struct Cache {
  dir: PathBuf,
}

/// Whether a read came from the server or from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
  Live,
  Cached,
}

impl Cache {
  pub fn new(dir: PathBuf) -> Self { Self { dir } }

  /// Default location: `<platform cache dir>/radar`.
  pub fn default_dir() -> PathBuf {
    dirs::cache_dir()
      .unwrap_or_else(std::env::temp_dir)
      .join("radar")
  }

  /// A file name for `path` plus `query`, safe on every platform.
  ///
  /// Distinct requests always get distinct names. Bytes outside
  /// `[A-Za-z0-9-]` are written as `_XX` hex, so escaped parts never contain
  /// the `+` (path segment), `.` (query pair) or `=` separators.
  pub fn key(path: &str, query: &[(&str, String)]) -> String {
    let path = path.strip_prefix('/').unwrap_or(path);
    let mut key = path.split('/').map(escape).collect::<Vec<_>>().join("+");
    for (k, v) in query {
      key.push('.');
      key.push_str(&escape(k));
      key.push('=');
      key.push_str(&escape(v));
    }
    key.push_str(".json");
    key
  }

  pub fn load(&self, key: &str) -> Option<String> {
    std::fs::read_to_string(self.dir.join(key)).ok()
  }

  /// Failures are logged, never fatal: the live response is already in hand.
  pub fn store(&self, key: &str, body: &str) {
    let result = std::fs::create_dir_all(&self.dir)
      .and_then(|()| std::fs::write(self.dir.join(key), body));
    if let Err(e) = result {
      tracing::warn!(dir = ?self.dir, error = %e, "failed to write cache");
    }
  }

  /// `GET` through the cache: live when possible, cached on a transient
  /// failure, an error otherwise.
  pub async fn read<T: DeserializeOwned>(
    &self,
    client: &ApiClient,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<(T, Freshness), ClientError> {
    let key = Self::key(path, query);
    match client.get_raw(path, query).await {
      Ok(raw) => {
        let value = client::decode(&raw)?;
        self.store(&key, &raw);
        Ok((value, Freshness::Live))
      }
      Err(e) if e.is_transient() => match self.load(&key) {
        Some(raw) => {
          tracing::info!(%key, "serving cached response");
          Ok((client::decode(&raw)?, Freshness::Cached))
        }
        None => Err(e),
      },
      Err(e) => Err(e),
    }
  }
}

fn escape(part: &str) -> String {
  let mut out = String::with_capacity(part.len());
  for b in part.bytes() {
    if b.is_ascii_alphanumeric() || b == b'-' {
      out.push(char::from(b));
    } else {
      out.push_str(&format!("_{b:02X}"));
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keys_are_flat_file_names() {
    let key = Cache::key("/items", &[("date", "2026-01-22".into()), ("freq", "T1".into())]);
    assert_eq!(key, "items.date=2026-01-22.freq=T1.json");
    assert!(!key.contains('/'));

    let users = Cache::key("/users/u 1/favorites", &[]);
    assert_eq!(users, "users+u_201+favorites.json");
  }

  #[test]
  fn different_requests_never_share_a_key() {
    let band = |freq: &str| Cache::key("/items", &[("date", "2026-01-22".into()), ("freq", freq.into())]);
    assert_ne!(band("Φ1"), band("Ψ1"));

    let favorites = |user: &str| Cache::key(&format!("/users/{user}/favorites"), &[]);
    let keys = [favorites("a b"), favorites("a_b"), favorites("a.b"), favorites("a+b")];
    for (i, a) in keys.iter().enumerate() {
      for b in &keys[i + 1..] {
        assert_ne!(a, b);
      }
    }

    // A separator inside a value cannot fake a second pair.
    assert_ne!(
      Cache::key("/items", &[("freq", "T1.date=x".into())]),
      Cache::key("/items", &[("freq", "T1".into()), ("date", "x".into())]),
    );
    // Nor can a slash inside a segment fake a deeper path.
    assert_ne!(Cache::key("/users/a/b/stances", &[]), Cache::key("/users/a+b/stances", &[]));
  }

  #[test]
  fn store_then_load() {
    let dir = std::env::temp_dir().join(format!("radar-cache-{}", uuid::Uuid::new_v4()));
    let cache = Cache::new(dir.clone());
    assert!(cache.load("bands.json").is_none());

    cache.store("bands.json", "[]");
    assert_eq!(cache.load("bands.json").as_deref(), Some("[]"));

    std::fs::remove_dir_all(dir).ok();
  }
}
