//! Handlers for per-user reaction endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users/{user}/items/{item}/like` | Flips the liked flag; returns `{"liked": bool}` |
//! | `PUT`  | `/users/{user}/items/{item}/stance` | Body: `{"stance": "A"\|"B"\|null}`; returns the resulting stance |
//! | `GET`  | `/users/{user}/items/{item}/reaction` | Current state, untouched if never reacted |
//! | `GET`  | `/users/{user}/favorites` | Liked items, newest first |
//! | `GET`  | `/users/{user}/stances` | Items with a stance, newest first |

use std::sync::Arc;

use axum::{Json, extract::State};
use radar_core::{
  band::Stance,
  reaction::{ReactedItem, UserAction},
  store::RadarStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Body, Segments},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct LikeState {
  pub liked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StanceState {
  pub stance: Option<Stance>,
}

/// `POST /users/{user}/items/{item}/like`
pub async fn like<S: RadarStore>(
  State(store): State<Arc<S>>,
  Segments((user, item)): Segments<(String, Uuid)>,
) -> Result<Json<LikeState>, ApiError> {
  let liked = store.toggle_like(user, item).await.map_err(ApiError::store)?;
  Ok(Json(LikeState { liked }))
}

/// `PUT /users/{user}/items/{item}/stance`
pub async fn stance<S: RadarStore>(
  State(store): State<Arc<S>>,
  Segments((user, item)): Segments<(String, Uuid)>,
  Body(body): Body<StanceState>,
) -> Result<Json<StanceState>, ApiError> {
  let stance = store
    .set_stance(user, item, body.stance)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(StanceState { stance }))
}

/// `GET /users/{user}/items/{item}/reaction`
pub async fn get_one<S: RadarStore>(
  State(store): State<Arc<S>>,
  Segments((user, item)): Segments<(String, Uuid)>,
) -> Result<Json<UserAction>, ApiError> {
  let state = store.get_reaction(user, item).await.map_err(ApiError::store)?;
  Ok(Json(state))
}

/// `GET /users/{user}/favorites`
pub async fn favorites<S: RadarStore>(
  State(store): State<Arc<S>>,
  Segments(user): Segments<String>,
) -> Result<Json<Vec<ReactedItem>>, ApiError> {
  let items = store.list_favorites(user).await.map_err(ApiError::store)?;
  Ok(Json(items))
}

/// `GET /users/{user}/stances`
pub async fn stances<S: RadarStore>(
  State(store): State<Arc<S>>,
  Segments(user): Segments<String>,
) -> Result<Json<Vec<ReactedItem>>, ApiError> {
  let items = store.list_stances(user).await.map_err(ApiError::store)?;
  Ok(Json(items))
}
