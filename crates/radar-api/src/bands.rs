//! Handlers for `/bands` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/bands` | All bands, ordered by `freq_id` |
//! | `PUT`  | `/bands/{freq_id}` | Body: [`BandBody`]; creates or replaces |

use std::sync::Arc;

use axum::{Json, extract::State};
use radar_core::{
  band::{Band, Domain},
  store::RadarStore,
};
use serde::Deserialize;

use crate::{
  error::ApiError,
  extract::{Body, Segments},
};

/// `GET /bands`
pub async fn list<S: RadarStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Band>>, ApiError> {
  let bands = store.list_bands().await.map_err(ApiError::store)?;
  Ok(Json(bands))
}

/// A band without its id; the id comes from the path.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandBody {
  pub question: String,
  pub side_a:   String,
  pub side_b:   String,
  pub domain:   Domain,
}

/// `PUT /bands/{freq_id}`
pub async fn upsert<S: RadarStore>(
  State(store): State<Arc<S>>,
  Segments(freq_id): Segments<String>,
  Body(body): Body<BandBody>,
) -> Result<Json<Band>, ApiError> {
  let band = Band {
    freq_id,
    question: body.question,
    side_a: body.side_a,
    side_b: body.side_b,
    domain: body.domain,
  };
  let band = store.upsert_band(band).await.map_err(ApiError::store)?;
  Ok(Json(band))
}
