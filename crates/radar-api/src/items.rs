//! Handlers for `/items` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/items` | `?date` required; optional `domain`, `freq` |
//! | `GET`    | `/items/today` | Same filters; the date is the server's today |
//! | `POST`   | `/items` | Body: [`NewRadarItem`]; 201 when created, 200 when overwritten. `?on_conflict=error` refuses to overwrite (409) |
//! | `POST`   | `/items/backfill` | Body: `[NewRadarItem]`; returns a [`BackfillReport`] |
//! | `GET`    | `/items/{id}` | 404 if not found |
//! | `DELETE` | `/items/{id}` | 204; reactions go with it |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use radar_core::{
  band::Domain,
  ingest::BackfillReport,
  item::{ItemView, NewRadarItem, RadarItem, Upserted},
  store::{ItemQuery, RadarStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Clock,
  error::ApiError,
  extract::{Body, Params, Segments},
};

// ─── Reads ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DateParams {
  pub date:   NaiveDate,
  pub domain: Option<Domain>,
  pub freq:   Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FilterParams {
  pub domain: Option<Domain>,
  pub freq:   Option<String>,
}

/// `GET /items?date=YYYY-MM-DD[&domain=...][&freq=...]`
pub async fn by_date<S: RadarStore>(
  State(store): State<Arc<S>>,
  Params(params): Params<DateParams>,
) -> Result<Json<Vec<ItemView>>, ApiError> {
  let query = ItemQuery { date: params.date, domain: params.domain, freq: params.freq };
  let items = store.items_by_date(query).await.map_err(ApiError::store)?;
  Ok(Json(items))
}

/// `GET /items/today[?domain=...][&freq=...]`
pub async fn today<S: RadarStore>(
  State(store): State<Arc<S>>,
  State(clock): State<Clock>,
  Params(params): Params<FilterParams>,
) -> Result<Json<Vec<ItemView>>, ApiError> {
  let query = ItemQuery { date: clock.today(), domain: params.domain, freq: params.freq };
  let items = store.items_by_date(query).await.map_err(ApiError::store)?;
  Ok(Json(items))
}

/// `GET /items/{id}`
pub async fn get_one<S: RadarStore>(
  State(store): State<Arc<S>>,
  Segments(id): Segments<Uuid>,
) -> Result<Json<RadarItem>, ApiError> {
  let item = store
    .get_item(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("item {id} not found")))?;
  Ok(Json(item))
}

// ─── Writes ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OnConflict {
  #[default]
  Update,
  Error,
}

#[derive(Debug, Deserialize)]
pub struct UpsertParams {
  #[serde(default)]
  pub on_conflict: OnConflict,
}

/// `POST /items[?on_conflict=update|error]`
pub async fn upsert<S: RadarStore>(
  State(store): State<Arc<S>>,
  Params(params): Params<UpsertParams>,
  Body(input): Body<NewRadarItem>,
) -> Result<impl IntoResponse, ApiError> {
  let upserted = match params.on_conflict {
    OnConflict::Update => store.upsert_item(input).await.map_err(ApiError::store)?,
    OnConflict::Error => {
      let item = store.insert_item(input).await.map_err(ApiError::store)?;
      Upserted { item, created: true }
    }
  };

  let status = if upserted.created { StatusCode::CREATED } else { StatusCode::OK };
  Ok((status, Json(upserted)))
}

/// `POST /items/backfill`
pub async fn backfill<S: RadarStore>(
  State(store): State<Arc<S>>,
  Body(candidates): Body<Vec<NewRadarItem>>,
) -> Result<Json<BackfillReport>, ApiError> {
  let report = store.backfill(candidates).await.map_err(ApiError::store)?;
  Ok(Json(report))
}

/// `DELETE /items/{id}`
pub async fn delete_one<S: RadarStore>(
  State(store): State<Arc<S>>,
  Segments(id): Segments<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_item(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
