//! Error types for `radar-core`, and the failure taxonomy every store error is
//! classified into.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::ingest::DraftStatus;

// ─── Validation ──────────────────────────────────────────────────────────────

/// A payload problem the caller must fix before resubmitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
  pub field:    String,
  pub reason:   String,
  /// Missing visible characters, set only for content-length failures.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub shortage: Option<usize>,
}

impl ValidationError {
  pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
    Self { field: field.into(), reason: reason.into(), shortage: None }
  }

  pub fn required(field: impl Into<String>) -> Self {
    Self::new(field, "required")
  }

  /// Content below the minimum visible length, `shortage` characters short.
  pub fn too_short(field: impl Into<String>, shortage: usize) -> Self {
    Self { shortage: Some(shortage), ..Self::new(field, "too_short") }
  }
}

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("unknown band: {0:?}")]
  UnknownBand(String),

  #[error("item not found: {0}")]
  ItemNotFound(Uuid),

  #[error("source not found: {0}")]
  SourceNotFound(Uuid),

  #[error("collection log entry not found: {0}")]
  EntryNotFound(Uuid),

  #[error("draft not found: {0}")]
  DraftNotFound(Uuid),

  #[error("draft {0} is already {1}")]
  DraftNotPending(Uuid, DraftStatus),

  #[error("an item already occupies {freq} on {date}")]
  DuplicateItem { date: NaiveDate, freq: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse class of a failure, used by outer layers to pick a response without
/// knowing the concrete error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
  /// Bad payload; not retryable without changing it.
  Validation,
  /// A referenced id does not exist.
  NotFound,
  /// A plain insert collided with an existing `(date, freq)`.
  Duplicate,
  /// The target is in a state that forbids the operation.
  Conflict,
  /// Storage unavailable or busy; safe to retry with the same payload.
  Transient,
  Internal,
}

impl FailureKind {
  pub fn is_retryable(self) -> bool { matches!(self, Self::Transient) }
}

/// Implemented by every error a [`crate::store::RadarStore`] can return.
pub trait Failure {
  fn kind(&self) -> FailureKind;

  /// The structured validation detail, when `kind()` is `Validation`.
  fn validation(&self) -> Option<&ValidationError> { None }
}

impl Failure for Error {
  fn kind(&self) -> FailureKind {
    match self {
      Self::Validation(_) | Self::UnknownBand(_) => FailureKind::Validation,
      Self::ItemNotFound(_)
      | Self::SourceNotFound(_)
      | Self::EntryNotFound(_)
      | Self::DraftNotFound(_) => FailureKind::NotFound,
      Self::DraftNotPending(..) => FailureKind::Conflict,
      Self::DuplicateItem { .. } => FailureKind::Duplicate,
      Self::Serialization(_) => FailureKind::Internal,
    }
  }

  fn validation(&self) -> Option<&ValidationError> {
    match self {
      Self::Validation(v) => Some(v),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn referential_and_validation_failures_are_distinct() {
    let short = Error::from(ValidationError::required("title"));
    assert_eq!(short.kind(), FailureKind::Validation);
    assert_eq!(short.validation().map(|v| v.field.as_str()), Some("title"));

    let missing = Error::ItemNotFound(Uuid::new_v4());
    assert_eq!(missing.kind(), FailureKind::NotFound);
    assert!(missing.validation().is_none());
    assert!(!missing.kind().is_retryable());

    let band = Error::UnknownBand("Z9".into());
    assert_eq!(band.kind(), FailureKind::Validation);
  }
}
