//! JSON REST API for the Thoughts Radar.
//!
//! Exposes an axum [`Router`] backed by any [`radar_core::store::RadarStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", radar_api::api_router(store.clone(), Clock::utc()))
//! ```

pub mod bands;
pub mod drafts;
pub mod error;
pub mod extract;
pub mod items;
pub mod reactions;
pub mod sources;

use std::sync::Arc;

use axum::{
  Router,
  extract::FromRef,
  routing::{get, post, put},
};
use chrono::{FixedOffset, NaiveDate, Offset as _, Utc};
use radar_core::store::RadarStore;

pub use error::ApiError;

/// Decides which calendar day "today" is.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
  pub utc_offset: FixedOffset,
}

impl Clock {
  pub fn utc() -> Self { Self { utc_offset: Utc.fix() } }

  /// `None` unless `hours` is within ±23.
  pub fn with_offset_hours(hours: i32) -> Option<Self> {
    if hours.abs() > 23 {
      return None;
    }
    FixedOffset::east_opt(hours * 3600).map(|utc_offset| Self { utc_offset })
  }

  pub fn today(&self) -> NaiveDate {
    Utc::now().with_timezone(&self.utc_offset).date_naive()
  }
}

/// Router state. Handlers extract the part they need through [`FromRef`].
pub struct ApiState<S> {
  pub store: Arc<S>,
  pub clock: Clock,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone(), clock: self.clock } }
}

impl<S> FromRef<ApiState<S>> for Arc<S> {
  fn from_ref(state: &ApiState<S>) -> Self { state.store.clone() }
}

impl<S> FromRef<ApiState<S>> for Clock {
  fn from_ref(state: &ApiState<S>) -> Self { state.clock }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, clock: Clock) -> Router<()>
where
  S: RadarStore + 'static,
{
  Router::new()
    // Bands
    .route("/bands", get(bands::list::<S>))
    .route("/bands/{freq_id}", put(bands::upsert::<S>))
    // Items
    .route("/items", get(items::by_date::<S>).post(items::upsert::<S>))
    .route("/items/backfill", post(items::backfill::<S>))
    .route("/items/today", get(items::today::<S>))
    .route("/items/{id}", get(items::get_one::<S>).delete(items::delete_one::<S>))
    // Reactions
    .route("/users/{user}/items/{item}/like", post(reactions::like::<S>))
    .route("/users/{user}/items/{item}/stance", put(reactions::stance::<S>))
    .route("/users/{user}/items/{item}/reaction", get(reactions::get_one::<S>))
    .route("/users/{user}/favorites", get(reactions::favorites::<S>))
    .route("/users/{user}/stances", get(reactions::stances::<S>))
    // Sources
    .route("/sources", get(sources::list::<S>).post(sources::create::<S>))
    .route("/sources/{id}/log", get(sources::log::<S>).post(sources::record::<S>))
    // Drafts
    .route("/drafts", get(drafts::list::<S>).post(drafts::create::<S>))
    .route("/drafts/{id}", get(drafts::get_one::<S>))
    .route("/drafts/{id}/approve", post(drafts::approve::<S>))
    .route("/drafts/{id}/reject", post(drafts::reject::<S>))
    .with_state(ApiState { store, clock })
}

#[cfg(test)]
mod tests;
