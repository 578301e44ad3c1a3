//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! | Failure | Status | Body |
//! |---------|--------|------|
//! | validation | 422 | `{"error", "field", "reason", "shortage"?}` |
//! | not found | 404 | `{"error"}` |
//! | duplicate, conflict | 409 | `{"error"}` |
//! | transient | 503 | `{"error", "retryable": true}` |
//! | internal | 500 | `{"error"}` |

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use radar_core::{Failure, FailureKind, ValidationError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("invalid {}: {}", .0.field, .0.reason)]
  Invalid(ValidationError),

  /// A store failure, already classified.
  #[error("{message}")]
  Store {
    kind:       FailureKind,
    message:    String,
    validation: Option<ValidationError>,
  },
}

impl ApiError {
  /// Classify a store error without knowing its concrete type.
  pub fn store<E: Failure + std::fmt::Display>(e: E) -> Self {
    Self::Store {
      kind:       e.kind(),
      message:    e.to_string(),
      validation: e.validation().cloned(),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
      Self::Store { kind, .. } => match kind {
        FailureKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        FailureKind::NotFound => StatusCode::NOT_FOUND,
        FailureKind::Duplicate | FailureKind::Conflict => StatusCode::CONFLICT,
        FailureKind::Transient => StatusCode::SERVICE_UNAVAILABLE,
        FailureKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

fn validation_body(message: String, v: &ValidationError) -> serde_json::Value {
  let mut body = json!({
    "error":  message,
    "field":  v.field,
    "reason": v.reason,
  });
  if let Some(shortage) = v.shortage {
    body["shortage"] = json!(shortage);
  }
  body
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = self.to_string();

    let body = match &self {
      Self::Invalid(v) => validation_body(message, v),
      Self::Store { validation: Some(v), .. } => validation_body(message, v),
      Self::Store { kind: FailureKind::Transient, .. } => {
        tracing::warn!(error = %message, "transient store failure");
        json!({ "error": message, "retryable": true })
      }
      Self::Store { kind: FailureKind::Internal, .. } => {
        tracing::error!(error = %message, "internal store failure");
        json!({ "error": message })
      }
      _ => json!({ "error": message }),
    };

    (status, Json(body)).into_response()
  }
}

// ─── Extractor rejections ────────────────────────────────────────────────────

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self {
    Self::Invalid(ValidationError::new("body", r.body_text()))
  }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self {
    Self::Invalid(ValidationError::new("query", r.body_text()))
  }
}

impl From<PathRejection> for ApiError {
  fn from(r: PathRejection) -> Self {
    Self::Invalid(ValidationError::new("path", r.body_text()))
  }
}

#[cfg(test)]
mod tests {
  use radar_core::Error as CoreError;
  use uuid::Uuid;

  use super::*;

  #[test]
  fn store_failures_map_to_statuses() {
    let short = ApiError::store(CoreError::from(ValidationError::too_short("content", 20)));
    assert_eq!(short.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let missing = ApiError::store(CoreError::ItemNotFound(Uuid::nil()));
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let dup = ApiError::store(CoreError::DuplicateItem {
      date: chrono::NaiveDate::from_ymd_opt(2026, 1, 22).unwrap(),
      freq: "T1".into(),
    });
    assert_eq!(dup.status(), StatusCode::CONFLICT);
  }

  #[test]
  fn validation_body_carries_shortage() {
    let v = ValidationError::too_short("content", 20);
    let body = validation_body("invalid".into(), &v);
    assert_eq!(body["field"], "content");
    assert_eq!(body["reason"], "too_short");
    assert_eq!(body["shortage"], 20);

    let body = validation_body("invalid".into(), &ValidationError::required("title"));
    assert!(body.get("shortage").is_none());
  }
}
