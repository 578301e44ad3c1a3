//! Error type for `radar-store-sqlite`.

use radar_core::{Failure, FailureKind, ValidationError};
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] radar_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value outside its enum.
  #[error("unknown {column} value: {value:?}")]
  UnknownValue { column: &'static str, value: String },
}

impl From<ValidationError> for Error {
  fn from(e: ValidationError) -> Self { Self::Core(e.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Failure for Error {
  fn kind(&self) -> FailureKind {
    match self {
      Self::Core(e) => e.kind(),
      Self::Database(e) if is_transient(e) => FailureKind::Transient,
      _ => FailureKind::Internal,
    }
  }

  fn validation(&self) -> Option<&ValidationError> {
    match self {
      Self::Core(e) => e.validation(),
      _ => None,
    }
  }
}

/// Whether retrying the same call later could succeed.
fn is_transient(e: &tokio_rusqlite::Error) -> bool {
  match e {
    tokio_rusqlite::Error::ConnectionClosed => true,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _)) => {
      matches!(f.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    }
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn busy_database_is_transient() {
    let busy = rusqlite::Error::SqliteFailure(
      rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
      None,
    );
    let err = Error::Database(tokio_rusqlite::Error::Rusqlite(busy));
    assert_eq!(err.kind(), FailureKind::Transient);

    let closed = Error::Database(tokio_rusqlite::Error::ConnectionClosed);
    assert!(closed.kind().is_retryable());

    let parse = Error::DateParse("bad".into());
    assert_eq!(parse.kind(), FailureKind::Internal);
  }
}
