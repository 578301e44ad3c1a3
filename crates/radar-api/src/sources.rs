//! Handlers for `/sources` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/sources` | All sources |
//! | `POST` | `/sources` | Body: [`NewSource`]; returns 201 |
//! | `GET`  | `/sources/{id}/log` | Collection log, newest first |
//! | `POST` | `/sources/{id}/log` | Body: [`LogBody`]; 201 when newly seen, 200 otherwise |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use radar_core::{
  ingest::{CollectionLogEntry, ContentSource, NewLogEntry, NewSource},
  store::RadarStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Body, Segments},
};

/// `GET /sources`
pub async fn list<S: RadarStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<ContentSource>>, ApiError> {
  let sources = store.list_sources().await.map_err(ApiError::store)?;
  Ok(Json(sources))
}

/// `POST /sources`
pub async fn create<S: RadarStore>(
  State(store): State<Arc<S>>,
  Body(body): Body<NewSource>,
) -> Result<impl IntoResponse, ApiError> {
  let source = store.add_source(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(source)))
}

/// `GET /sources/{id}/log`
pub async fn log<S: RadarStore>(
  State(store): State<Arc<S>>,
  Segments(source_id): Segments<Uuid>,
) -> Result<Json<Vec<CollectionLogEntry>>, ApiError> {
  let entries = store
    .list_collection_log(source_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entries))
}

/// A log entry without its source; the source comes from the path.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogBody {
  pub external_id: String,
  #[serde(default)]
  pub title:       Option<String>,
  #[serde(default)]
  pub url:         Option<String>,
}

/// `POST /sources/{id}/log`
pub async fn record<S: RadarStore>(
  State(store): State<Arc<S>>,
  Segments(source_id): Segments<Uuid>,
  Body(body): Body<LogBody>,
) -> Result<impl IntoResponse, ApiError> {
  let logged = store
    .log_collection(NewLogEntry {
      source_id,
      external_id: body.external_id,
      title: body.title,
      url: body.url,
    })
    .await
    .map_err(ApiError::store)?;

  let status = if logged.newly_seen { StatusCode::CREATED } else { StatusCode::OK };
  Ok((status, Json(logged)))
}
