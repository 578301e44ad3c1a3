//! Handlers for `/drafts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/drafts` | Optional `?status=pending\|approved\|rejected` |
//! | `POST` | `/drafts` | Body: [`NewDraft`]; returns 201 |
//! | `GET`  | `/drafts/{id}` | 404 if not found |
//! | `POST` | `/drafts/{id}/approve` | Publishes through backfill; 409 unless pending |
//! | `POST` | `/drafts/{id}/reject` | Body: `{"note": "..."}` (optional); 409 unless pending |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use radar_core::{
  ingest::{Draft, DraftStatus, NewDraft, Promotion},
  store::RadarStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Body, Params, Segments},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<DraftStatus>,
}

/// `GET /drafts[?status=<status>]`
pub async fn list<S: RadarStore>(
  State(store): State<Arc<S>>,
  Params(params): Params<ListParams>,
) -> Result<Json<Vec<Draft>>, ApiError> {
  let drafts = store.list_drafts(params.status).await.map_err(ApiError::store)?;
  Ok(Json(drafts))
}

/// `POST /drafts`
pub async fn create<S: RadarStore>(
  State(store): State<Arc<S>>,
  Body(body): Body<NewDraft>,
) -> Result<impl IntoResponse, ApiError> {
  let draft = store.create_draft(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(draft)))
}

/// `GET /drafts/{id}`
pub async fn get_one<S: RadarStore>(
  State(store): State<Arc<S>>,
  Segments(id): Segments<Uuid>,
) -> Result<Json<Draft>, ApiError> {
  let draft = store
    .get_draft(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("draft {id} not found")))?;
  Ok(Json(draft))
}

/// `POST /drafts/{id}/approve`
pub async fn approve<S: RadarStore>(
  State(store): State<Arc<S>>,
  Segments(id): Segments<Uuid>,
) -> Result<Json<Promotion>, ApiError> {
  let promotion = store.approve_draft(id).await.map_err(ApiError::store)?;
  Ok(Json(promotion))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RejectBody {
  #[serde(default)]
  pub note: Option<String>,
}

/// `POST /drafts/{id}/reject`
pub async fn reject<S: RadarStore>(
  State(store): State<Arc<S>>,
  Segments(id): Segments<Uuid>,
  Body(body): Body<RejectBody>,
) -> Result<Json<Draft>, ApiError> {
  let draft = store.reject_draft(id, body.note).await.map_err(ApiError::store)?;
  Ok(Json(draft))
}
