//! The `RadarStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `radar-store-sqlite`).
//! Higher layers (`radar-api`, `radar-server`) depend on this abstraction and
//! receive a store explicitly; nothing holds a global connection.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  band::{Band, Domain, Stance},
  error::Failure,
  ingest::{
    BackfillReport, CollectionLogEntry, ContentSource, Draft, DraftStatus,
    Logged, NewDraft, NewLogEntry, NewSource, Promotion,
  },
  item::{ItemView, NewRadarItem, RadarItem, Upserted},
  reaction::{ReactedItem, UserAction},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`RadarStore::items_by_date`].
#[derive(Debug, Clone)]
pub struct ItemQuery {
  pub date:   NaiveDate,
  /// Restrict to bands of one domain.
  pub domain: Option<Domain>,
  /// Restrict to a single band.
  pub freq:   Option<String>,
}

impl ItemQuery {
  pub fn on(date: NaiveDate) -> Self { Self { date, domain: None, freq: None } }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a radar store backend.
///
/// Every write is idempotent or last-write-wins, so callers may retry a
/// transient failure with the same arguments. Races on `(date, freq)` and on
/// `(user_id, item_id)` are resolved by the backend's atomic
/// insert-or-update primitive, never by in-process locking.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RadarStore: Send + Sync {
  type Error: std::error::Error + Failure + Send + Sync + 'static;

  // ── Bands ─────────────────────────────────────────────────────────────

  /// Create a band or replace the framing and domain of an existing one.
  fn upsert_band(
    &self,
    band: Band,
  ) -> impl Future<Output = Result<Band, Self::Error>> + Send + '_;

  /// All bands, ordered by `freq_id`.
  fn list_bands(
    &self,
  ) -> impl Future<Output = Result<Vec<Band>, Self::Error>> + Send + '_;

  fn get_band(
    &self,
    freq_id: String,
  ) -> impl Future<Output = Result<Option<Band>, Self::Error>> + Send + '_;

  // ── Item writes ──────────────────────────────────────────────────────

  /// Insert `input`, or overwrite every mutable field of the item already on
  /// its `(date, freq)`. The existing item keeps its `item_id`.
  ///
  /// Fails with a validation error before touching storage if the payload is
  /// invalid, and with an unknown-band error if `freq` is not a band.
  fn upsert_item(
    &self,
    input: NewRadarItem,
  ) -> impl Future<Output = Result<Upserted, Self::Error>> + Send + '_;

  /// Insert `input` without overwriting. A `(date, freq)` collision is a
  /// duplicate-key error.
  fn insert_item(
    &self,
    input: NewRadarItem,
  ) -> impl Future<Output = Result<RadarItem, Self::Error>> + Send + '_;

  /// Bulk insert that leaves occupied slots alone.
  ///
  /// Runs in one transaction: occupied `freq` codes are loaded per date,
  /// candidates are filtered with [`crate::ingest::plan_backfill`], and the
  /// survivors go through the same upsert as [`RadarStore::upsert_item`].
  fn backfill(
    &self,
    candidates: Vec<NewRadarItem>,
  ) -> impl Future<Output = Result<BackfillReport, Self::Error>> + Send + '_;

  /// Moderation purge. Reactions to the item go with it.
  fn delete_item(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Item reads ────────────────────────────────────────────────────────

  fn get_item(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Option<RadarItem>, Self::Error>> + Send + '_;

  /// Items published on `query.date`, joined with their bands, ordered by
  /// `freq`.
  fn items_by_date(
    &self,
    query: ItemQuery,
  ) -> impl Future<Output = Result<Vec<ItemView>, Self::Error>> + Send + '_;

  // ── Reactions ─────────────────────────────────────────────────────────

  /// Flip the liked flag and return the new value.
  fn toggle_like(
    &self,
    user_id: String,
    item_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Select a stance. Selecting the stored stance again clears it; `None`
  /// always clears. Returns the resulting stance.
  fn set_stance(
    &self,
    user_id: String,
    item_id: Uuid,
    stance: Option<Stance>,
  ) -> impl Future<Output = Result<Option<Stance>, Self::Error>> + Send + '_;

  /// Current reaction state; the untouched state if the user never reacted.
  fn get_reaction(
    &self,
    user_id: String,
    item_id: Uuid,
  ) -> impl Future<Output = Result<UserAction, Self::Error>> + Send + '_;

  /// Items the user liked, most recent publish date first.
  fn list_favorites(
    &self,
    user_id: String,
  ) -> impl Future<Output = Result<Vec<ReactedItem>, Self::Error>> + Send + '_;

  /// Items the user took a stance on, most recent publish date first.
  fn list_stances(
    &self,
    user_id: String,
  ) -> impl Future<Output = Result<Vec<ReactedItem>, Self::Error>> + Send + '_;

  // ── Sources and collection log ────────────────────────────────────────

  fn add_source(
    &self,
    input: NewSource,
  ) -> impl Future<Output = Result<ContentSource, Self::Error>> + Send + '_;

  fn list_sources(
    &self,
  ) -> impl Future<Output = Result<Vec<ContentSource>, Self::Error>> + Send + '_;

  /// Record that a document was seen from a source. Seeing the same
  /// `(source_id, external_id)` again returns the original entry.
  fn log_collection(
    &self,
    input: NewLogEntry,
  ) -> impl Future<Output = Result<Logged, Self::Error>> + Send + '_;

  /// Entries for one source, newest first.
  fn list_collection_log(
    &self,
    source_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CollectionLogEntry>, Self::Error>> + Send + '_;

  // ── Drafts ────────────────────────────────────────────────────────────

  fn create_draft(
    &self,
    input: NewDraft,
  ) -> impl Future<Output = Result<Draft, Self::Error>> + Send + '_;

  fn get_draft(
    &self,
    draft_id: Uuid,
  ) -> impl Future<Output = Result<Option<Draft>, Self::Error>> + Send + '_;

  /// Drafts, newest first, optionally filtered by status.
  fn list_drafts(
    &self,
    status: Option<DraftStatus>,
  ) -> impl Future<Output = Result<Vec<Draft>, Self::Error>> + Send + '_;

  /// Publish a pending draft's candidates through [`RadarStore::backfill`]
  /// and mark it approved. Approval never bypasses validation: invalid
  /// candidates are reported as rejected and not written.
  fn approve_draft(
    &self,
    draft_id: Uuid,
  ) -> impl Future<Output = Result<Promotion, Self::Error>> + Send + '_;

  /// Mark a pending draft rejected.
  fn reject_draft(
    &self,
    draft_id: Uuid,
    note: Option<String>,
  ) -> impl Future<Output = Result<Draft, Self::Error>> + Send + '_;
}
