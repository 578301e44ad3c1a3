//! [`SqliteStore`], the SQLite implementation of [`RadarStore`].

use std::{
  collections::{HashMap, HashSet},
  path::Path,
  time::Duration,
};

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use radar_core::{
  band::{Band, Stance},
  ingest::{
    BackfillReport, CollectionLogEntry, ContentSource, Draft, DraftStatus,
    Logged, NewDraft, NewLogEntry, NewSource, Occupancy, Promotion, batch_dates,
    plan_backfill,
  },
  item::{ItemView, NewRadarItem, RadarItem, Upserted},
  reaction::{ReactedItem, UserAction, check_user_id},
  store::{ItemQuery, RadarStore},
  validate::MIN_CONTENT_LENGTH,
};

use crate::{
  Error, Result,
  encode::{
    ITEM_COLUMN_COUNT, ITEM_COLUMNS, ItemParams, RawBand, RawDraft, RawItem,
    RawLogEntry, RawReactedItem, RawSource, decode_dt, decode_enum,
    encode_candidates, encode_date, encode_dt, encode_stance, encode_uuid,
  },
  schema::SCHEMA,
};

/// How long a statement waits on a locked database before failing with
/// `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── SQL ─────────────────────────────────────────────────────────────────────

/// Columns of a bare `radar_items` row, for `RETURNING` clauses.
const ITEM_FIELDS: &str = "item_id, date, freq, stance, title, author_name, \
   author_avatar, author_bio, source, source_url, content, tension_q, \
   tension_a, tension_b, keywords, video_id, created_at, updated_at";

const INSERT_ITEM: &str = "INSERT INTO radar_items (
     item_id, date, freq, stance, title, author_name, author_avatar,
     author_bio, source, source_url, content, tension_q, tension_a,
     tension_b, keywords, video_id, created_at, updated_at
   ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
             ?15, ?16, ?17, ?17)";

/// Every column except `item_id` and `created_at` is overwritten on conflict.
const UPSERT_CONFLICT: &str = "ON CONFLICT (date, freq) DO UPDATE SET
     stance        = excluded.stance,
     title         = excluded.title,
     author_name   = excluded.author_name,
     author_avatar = excluded.author_avatar,
     author_bio    = excluded.author_bio,
     source        = excluded.source,
     source_url    = excluded.source_url,
     content       = excluded.content,
     tension_q     = excluded.tension_q,
     tension_a     = excluded.tension_a,
     tension_b     = excluded.tension_b,
     keywords      = excluded.keywords,
     video_id      = excluded.video_id,
     updated_at    = excluded.updated_at";

const TOGGLE_LIKE: &str = "INSERT INTO user_actions (user_id, item_id, liked, stance, updated_at)
   VALUES (?1, ?2, 1, NULL, ?3)
   ON CONFLICT (user_id, item_id) DO UPDATE SET
     liked      = 1 - user_actions.liked,
     updated_at = excluded.updated_at
   RETURNING liked";

const SET_STANCE: &str = "INSERT INTO user_actions (user_id, item_id, liked, stance, updated_at)
   VALUES (?1, ?2, 0, ?3, ?4)
   ON CONFLICT (user_id, item_id) DO UPDATE SET
     stance     = CASE WHEN user_actions.stance IS excluded.stance
                       THEN NULL ELSE excluded.stance END,
     updated_at = excluded.updated_at
   RETURNING stance";

const DRAFT_COLUMNS: &str =
  "draft_id, source_id, entry_id, candidates, status, note, created_at, reviewed_at";

const SOURCE_COLUMNS: &str = "source_id, name, kind, url, active, created_at";

const LOG_COLUMNS: &str = "entry_id, source_id, external_id, title, url, seen_at";

// ─── Connection-thread helpers ───────────────────────────────────────────────
//
// These run inside `Connection::call` closures, on the connection's own
// thread, and only speak `rusqlite`.

fn exists(
  conn: &rusqlite::Connection,
  sql: &str,
  id: &str,
) -> rusqlite::Result<bool> {
  Ok(conn.query_row(sql, rusqlite::params![id], |_| Ok(())).optional()?.is_some())
}

fn band_exists(conn: &rusqlite::Connection, freq: &str) -> rusqlite::Result<bool> {
  exists(conn, "SELECT 1 FROM bands WHERE freq_id = ?1", freq)
}

fn item_exists(conn: &rusqlite::Connection, item_id: &str) -> rusqlite::Result<bool> {
  exists(conn, "SELECT 1 FROM radar_items WHERE item_id = ?1", item_id)
}

fn source_exists(conn: &rusqlite::Connection, source_id: &str) -> rusqlite::Result<bool> {
  exists(conn, "SELECT 1 FROM content_sources WHERE source_id = ?1", source_id)
}

fn write_item(
  conn: &rusqlite::Connection,
  p: &ItemParams,
  on_conflict: &str,
) -> rusqlite::Result<RawItem> {
  let sql = format!("{INSERT_ITEM} {on_conflict} RETURNING {ITEM_FIELDS}");
  conn.query_row(
    &sql,
    rusqlite::params![
      p.item_id,
      p.date,
      p.freq,
      p.stance,
      p.title,
      p.author_name,
      p.author_avatar,
      p.author_bio,
      p.source,
      p.source_url,
      p.content,
      p.tension_q,
      p.tension_a,
      p.tension_b,
      p.keywords,
      p.video_id,
      p.now,
    ],
    RawItem::from_row,
  )
}

fn upsert_row(conn: &rusqlite::Connection, p: &ItemParams) -> rusqlite::Result<RawItem> {
  write_item(conn, p, UPSERT_CONFLICT)
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

fn other(e: impl std::error::Error + Send + Sync + 'static) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

/// The backfill body, shared by [`RadarStore::backfill`] and draft approval.
/// Must run inside a transaction so the occupancy snapshot stays valid until
/// the writes land.
fn backfill_in(
  tx: &rusqlite::Transaction<'_>,
  candidates: Vec<NewRadarItem>,
  now: DateTime<Utc>,
) -> tokio_rusqlite::Result<BackfillReport> {
  let known: HashSet<String> = {
    let mut stmt = tx.prepare("SELECT freq_id FROM bands")?;
    stmt
      .query_map([], |r| r.get(0))?
      .collect::<rusqlite::Result<_>>()?
  };

  let mut occupied: Occupancy = HashMap::new();
  {
    let mut stmt = tx.prepare("SELECT freq FROM radar_items WHERE date = ?1")?;
    for date in batch_dates(&candidates) {
      let taken: HashSet<String> = stmt
        .query_map(rusqlite::params![encode_date(date)], |r| r.get(0))?
        .collect::<rusqlite::Result<_>>()?;
      occupied.insert(date, taken);
    }
  }

  let plan = plan_backfill(candidates, &known, occupied, MIN_CONTENT_LENGTH);

  let mut inserted = Vec::with_capacity(plan.accepted.len());
  for (_, candidate) in plan.accepted {
    let key = candidate.key();
    let params = ItemParams::new(candidate, now).map_err(other)?;
    upsert_row(tx, &params)?;
    inserted.push(key);
  }

  Ok(BackfillReport { inserted, skipped: plan.skipped, rejected: plan.rejected })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A radar store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

enum Insert {
  Done(RawItem),
  UnknownBand,
  Duplicate,
}

enum Review {
  Done(RawDraft, BackfillReport),
  Missing,
  NotPending(String),
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the connection. Calls on other clones fail afterwards with a
  /// transient "connection closed" error.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn read_draft(&self, draft_id: Uuid) -> Result<Option<Draft>> {
    let id_str = encode_uuid(draft_id);
    let raw: Option<RawDraft> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {DRAFT_COLUMNS} FROM drafts WHERE draft_id = ?1"),
              rusqlite::params![id_str],
              RawDraft::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawDraft::into_draft).transpose()
  }

  /// Items joined with one user's reaction, filtered by `condition` on the
  /// `user_actions a` alias.
  async fn reacted_items(
    &self,
    user_id: String,
    condition: &'static str,
  ) -> Result<Vec<ReactedItem>> {
    check_user_id(&user_id)?;

    let raws: Vec<RawReactedItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ITEM_COLUMNS}, a.liked, a.stance
           FROM user_actions a
           JOIN radar_items i ON i.item_id = a.item_id
           WHERE a.user_id = ?1 AND {condition}
           ORDER BY i.date DESC, i.freq ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], RawReactedItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReactedItem::into_reacted).collect()
  }
}

// ─── RadarStore impl ─────────────────────────────────────────────────────────

impl RadarStore for SqliteStore {
  type Error = Error;

  // ── Bands ─────────────────────────────────────────────────────────────────

  async fn upsert_band(&self, band: Band) -> Result<Band> {
    let band = Band {
      freq_id:  band.freq_id.trim().to_owned(),
      question: band.question.trim().to_owned(),
      side_a:   band.side_a.trim().to_owned(),
      side_b:   band.side_b.trim().to_owned(),
      domain:   band.domain,
    };
    band.validate()?;

    let row = band.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO bands (freq_id, question, side_a, side_b, domain)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (freq_id) DO UPDATE SET
             question = excluded.question,
             side_a   = excluded.side_a,
             side_b   = excluded.side_b,
             domain   = excluded.domain",
          rusqlite::params![
            row.freq_id,
            row.question,
            row.side_a,
            row.side_b,
            row.domain.as_str(),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(band)
  }

  async fn list_bands(&self) -> Result<Vec<Band>> {
    let raws: Vec<RawBand> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT freq_id, question, side_a, side_b, domain FROM bands ORDER BY freq_id",
        )?;
        let rows = stmt
          .query_map([], |row| RawBand::from_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBand::into_band).collect()
  }

  async fn get_band(&self, freq_id: String) -> Result<Option<Band>> {
    let raw: Option<RawBand> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT freq_id, question, side_a, side_b, domain FROM bands WHERE freq_id = ?1",
              rusqlite::params![freq_id],
              |row| RawBand::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawBand::into_band).transpose()
  }

  // ── Item writes ──────────────────────────────────────────────────────────

  async fn upsert_item(&self, input: NewRadarItem) -> Result<Upserted> {
    let input = input.normalize();
    input.validate(MIN_CONTENT_LENGTH)?;

    let key = input.key();
    let params = ItemParams::new(input, Utc::now())?;
    let fresh_id = params.item_id.clone();

    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        if !band_exists(conn, &params.freq)? {
          return Ok(None);
        }
        Ok(Some(upsert_row(conn, &params)?))
      })
      .await?;

    let item = raw
      .ok_or_else(|| radar_core::Error::UnknownBand(key.freq.clone()))?
      .into_item()?;
    let created = encode_uuid(item.item_id) == fresh_id;

    tracing::debug!(date = %key.date, freq = %key.freq, created, "upserted radar item");
    Ok(Upserted { item, created })
  }

  async fn insert_item(&self, input: NewRadarItem) -> Result<RadarItem> {
    let input = input.normalize();
    input.validate(MIN_CONTENT_LENGTH)?;

    let key = input.key();
    let params = ItemParams::new(input, Utc::now())?;

    let outcome = self
      .conn
      .call(move |conn| {
        if !band_exists(conn, &params.freq)? {
          return Ok(Insert::UnknownBand);
        }
        match write_item(conn, &params, "") {
          Ok(raw) => Ok(Insert::Done(raw)),
          Err(e) if is_unique_violation(&e) => Ok(Insert::Duplicate),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    match outcome {
      Insert::Done(raw) => raw.into_item(),
      Insert::UnknownBand => Err(radar_core::Error::UnknownBand(key.freq).into()),
      Insert::Duplicate => {
        tracing::warn!(date = %key.date, freq = %key.freq, "plain insert collided");
        Err(radar_core::Error::DuplicateItem { date: key.date, freq: key.freq }.into())
      }
    }
  }

  async fn backfill(&self, candidates: Vec<NewRadarItem>) -> Result<BackfillReport> {
    let total = candidates.len();
    let now = Utc::now();

    let report = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let report = backfill_in(&tx, candidates, now)?;
        tx.commit()?;
        Ok(report)
      })
      .await?;

    tracing::info!(
      total,
      inserted = report.inserted.len(),
      skipped = report.skipped.len(),
      rejected = report.rejected.len(),
      "backfill complete"
    );
    Ok(report)
  }

  async fn delete_item(&self, item_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(item_id);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM radar_items WHERE item_id = ?1", rusqlite::params![
          id_str
        ])?)
      })
      .await?;

    if deleted == 0 {
      return Err(radar_core::Error::ItemNotFound(item_id).into());
    }
    tracing::info!(%item_id, "deleted radar item");
    Ok(())
  }

  // ── Item reads ────────────────────────────────────────────────────────────

  async fn get_item(&self, item_id: Uuid) -> Result<Option<RadarItem>> {
    let id_str = encode_uuid(item_id);
    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ITEM_COLUMNS} FROM radar_items i WHERE i.item_id = ?1"),
              rusqlite::params![id_str],
              RawItem::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawItem::into_item).transpose()
  }

  async fn items_by_date(&self, query: ItemQuery) -> Result<Vec<ItemView>> {
    let date_str   = encode_date(query.date);
    let domain_str = query.domain.map(|d| d.as_str().to_owned());
    let freq       = query.freq;

    let raws: Vec<(RawItem, RawBand)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ITEM_COLUMNS}, b.freq_id, b.question, b.side_a, b.side_b, b.domain
           FROM radar_items i
           JOIN bands b ON b.freq_id = i.freq
           WHERE i.date = ?1
             AND (?2 IS NULL OR b.domain = ?2)
             AND (?3 IS NULL OR i.freq = ?3)
           ORDER BY i.freq"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![date_str, domain_str, freq], |row| {
            Ok((RawItem::from_row(row)?, RawBand::from_row(row, ITEM_COLUMN_COUNT)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(item, band)| Ok(ItemView::new(item.into_item()?, &band.into_band()?)))
      .collect()
  }

  // ── Reactions ─────────────────────────────────────────────────────────────

  async fn toggle_like(&self, user_id: String, item_id: Uuid) -> Result<bool> {
    check_user_id(&user_id)?;
    let id_str = encode_uuid(item_id);
    let now    = encode_dt(Utc::now());

    let liked: Option<bool> = self
      .conn
      .call(move |conn| {
        if !item_exists(conn, &id_str)? {
          return Ok(None);
        }
        let liked = conn.query_row(
          TOGGLE_LIKE,
          rusqlite::params![user_id, id_str, now],
          |r| r.get(0),
        )?;
        Ok(Some(liked))
      })
      .await?;

    Ok(liked.ok_or(radar_core::Error::ItemNotFound(item_id))?)
  }

  async fn set_stance(
    &self,
    user_id: String,
    item_id: Uuid,
    stance:  Option<Stance>,
  ) -> Result<Option<Stance>> {
    check_user_id(&user_id)?;
    let id_str     = encode_uuid(item_id);
    let stance_str = stance.map(encode_stance);
    let now        = encode_dt(Utc::now());

    let stored: Option<Option<String>> = self
      .conn
      .call(move |conn| {
        if !item_exists(conn, &id_str)? {
          return Ok(None);
        }
        let stored = conn.query_row(
          SET_STANCE,
          rusqlite::params![user_id, id_str, stance_str, now],
          |r| r.get(0),
        )?;
        Ok(Some(stored))
      })
      .await?;

    let stored = stored.ok_or(radar_core::Error::ItemNotFound(item_id))?;
    stored.as_deref().map(|s| decode_enum("stance", s)).transpose()
  }

  async fn get_reaction(&self, user_id: String, item_id: Uuid) -> Result<UserAction> {
    check_user_id(&user_id)?;
    let id_str = encode_uuid(item_id);
    let user   = user_id.clone();

    type Row = (bool, Option<String>, String);
    let row: Option<Option<Row>> = self
      .conn
      .call(move |conn| {
        if !item_exists(conn, &id_str)? {
          return Ok(None);
        }
        let row = conn
          .query_row(
            "SELECT liked, stance, updated_at FROM user_actions
             WHERE user_id = ?1 AND item_id = ?2",
            rusqlite::params![user, id_str],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
          )
          .optional()?;
        Ok(Some(row))
      })
      .await?;

    match row.ok_or(radar_core::Error::ItemNotFound(item_id))? {
      None => Ok(UserAction::untouched(user_id, item_id)),
      Some((liked, stance, updated_at)) => Ok(UserAction {
        user_id,
        item_id,
        liked,
        stance: stance.as_deref().map(|s| decode_enum("stance", s)).transpose()?,
        updated_at: Some(decode_dt(&updated_at)?),
      }),
    }
  }

  async fn list_favorites(&self, user_id: String) -> Result<Vec<ReactedItem>> {
    self.reacted_items(user_id, "a.liked = 1").await
  }

  async fn list_stances(&self, user_id: String) -> Result<Vec<ReactedItem>> {
    self.reacted_items(user_id, "a.stance IS NOT NULL").await
  }

  // ── Sources and collection log ────────────────────────────────────────────

  async fn add_source(&self, input: NewSource) -> Result<ContentSource> {
    input.validate()?;
    let source = ContentSource {
      source_id:  Uuid::new_v4(),
      name:       input.name.trim().to_owned(),
      kind:       input.kind,
      url:        input.url.filter(|u| !u.trim().is_empty()),
      active:     input.active,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(source.source_id);
    let name     = source.name.clone();
    let kind_str = source.kind.as_str().to_owned();
    let url      = source.url.clone();
    let active   = source.active;
    let at_str   = encode_dt(source.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO content_sources (source_id, name, kind, url, active, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, kind_str, url, active, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(source)
  }

  async fn list_sources(&self) -> Result<Vec<ContentSource>> {
    let raws: Vec<RawSource> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SOURCE_COLUMNS} FROM content_sources ORDER BY name, source_id"
        ))?;
        let rows = stmt
          .query_map([], RawSource::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSource::into_source).collect()
  }

  async fn log_collection(&self, input: NewLogEntry) -> Result<Logged> {
    input.validate()?;
    let source_id   = input.source_id;
    let src_str     = encode_uuid(source_id);
    let entry_str   = encode_uuid(Uuid::new_v4());
    let external_id = input.external_id.trim().to_owned();
    let title       = input.title;
    let url         = input.url;
    let at_str      = encode_dt(Utc::now());

    let outcome: Option<(RawLogEntry, bool)> = self
      .conn
      .call(move |conn| {
        if !source_exists(conn, &src_str)? {
          return Ok(None);
        }
        let inserted = conn.execute(
          "INSERT INTO collection_log (entry_id, source_id, external_id, title, url, seen_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (source_id, external_id) DO NOTHING",
          rusqlite::params![entry_str, src_str, external_id, title, url, at_str],
        )?;
        let raw = conn.query_row(
          &format!(
            "SELECT {LOG_COLUMNS} FROM collection_log
             WHERE source_id = ?1 AND external_id = ?2"
          ),
          rusqlite::params![src_str, external_id],
          RawLogEntry::from_row,
        )?;
        Ok(Some((raw, inserted == 1)))
      })
      .await?;

    let (raw, newly_seen) = outcome.ok_or(radar_core::Error::SourceNotFound(source_id))?;
    Ok(Logged { entry: raw.into_entry()?, newly_seen })
  }

  async fn list_collection_log(&self, source_id: Uuid) -> Result<Vec<CollectionLogEntry>> {
    let src_str = encode_uuid(source_id);

    let raws: Option<Vec<RawLogEntry>> = self
      .conn
      .call(move |conn| {
        if !source_exists(conn, &src_str)? {
          return Ok(None);
        }
        let mut stmt = conn.prepare(&format!(
          "SELECT {LOG_COLUMNS} FROM collection_log
           WHERE source_id = ?1
           ORDER BY seen_at DESC, entry_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![src_str], RawLogEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(rows))
      })
      .await?;

    raws
      .ok_or(radar_core::Error::SourceNotFound(source_id))?
      .into_iter()
      .map(RawLogEntry::into_entry)
      .collect()
  }

  // ── Drafts ────────────────────────────────────────────────────────────────

  async fn create_draft(&self, input: NewDraft) -> Result<Draft> {
    input.validate()?;
    let draft = Draft {
      draft_id:    Uuid::new_v4(),
      source_id:   input.source_id,
      entry_id:    input.entry_id,
      candidates:  input.candidates.into_iter().map(NewRadarItem::normalize).collect(),
      status:      DraftStatus::Pending,
      note:        None,
      created_at:  Utc::now(),
      reviewed_at: None,
    };

    let id_str     = encode_uuid(draft.draft_id);
    let source_id  = draft.source_id;
    let entry_id   = draft.entry_id;
    let candidates = encode_candidates(&draft.candidates)?;
    let at_str     = encode_dt(draft.created_at);

    let missing: Option<radar_core::Error> = self
      .conn
      .call(move |conn| {
        let src_str   = source_id.map(encode_uuid);
        let entry_str = entry_id.map(encode_uuid);
        if let (Some(id), Some(s)) = (source_id, &src_str) {
          if !source_exists(conn, s)? {
            return Ok(Some(radar_core::Error::SourceNotFound(id)));
          }
        }
        if let (Some(id), Some(e)) = (entry_id, &entry_str) {
          if !exists(conn, "SELECT 1 FROM collection_log WHERE entry_id = ?1", e)? {
            return Ok(Some(radar_core::Error::EntryNotFound(id)));
          }
        }
        conn.execute(
          "INSERT INTO drafts (draft_id, source_id, entry_id, candidates, status, created_at)
           VALUES (?1, ?2, ?3, ?4, 'pending', ?5)",
          rusqlite::params![id_str, src_str, entry_str, candidates, at_str],
        )?;
        Ok(None)
      })
      .await?;

    if let Some(e) = missing {
      return Err(e.into());
    }
    tracing::info!(
      draft_id = %draft.draft_id,
      candidates = draft.candidates.len(),
      "draft created"
    );
    Ok(draft)
  }

  async fn get_draft(&self, draft_id: Uuid) -> Result<Option<Draft>> {
    self.read_draft(draft_id).await
  }

  async fn list_drafts(&self, status: Option<DraftStatus>) -> Result<Vec<Draft>> {
    let status_str = status.map(|s| s.as_str().to_owned());

    let raws: Vec<RawDraft> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DRAFT_COLUMNS} FROM drafts
           WHERE ?1 IS NULL OR status = ?1
           ORDER BY created_at DESC, draft_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![status_str], RawDraft::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDraft::into_draft).collect()
  }

  async fn approve_draft(&self, draft_id: Uuid) -> Result<Promotion> {
    let id_str = encode_uuid(draft_id);
    let now    = Utc::now();

    let review = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let select = format!("SELECT {DRAFT_COLUMNS} FROM drafts WHERE draft_id = ?1");

        let Some(raw) = tx
          .query_row(&select, rusqlite::params![id_str], RawDraft::from_row)
          .optional()?
        else {
          return Ok(Review::Missing);
        };
        if raw.status != DraftStatus::Pending.as_str() {
          return Ok(Review::NotPending(raw.status));
        }

        let candidates: Vec<NewRadarItem> =
          serde_json::from_str(&raw.candidates).map_err(other)?;
        let report = backfill_in(&tx, candidates, now)?;

        tx.execute(
          "UPDATE drafts SET status = 'approved', reviewed_at = ?2 WHERE draft_id = ?1",
          rusqlite::params![id_str, encode_dt(now)],
        )?;
        let raw = tx.query_row(&select, rusqlite::params![id_str], RawDraft::from_row)?;
        tx.commit()?;
        Ok(Review::Done(raw, report))
      })
      .await?;

    match review {
      Review::Done(raw, report) => {
        tracing::info!(
          %draft_id,
          inserted = report.inserted.len(),
          skipped = report.skipped.len(),
          rejected = report.rejected.len(),
          "draft approved"
        );
        Ok(Promotion { draft: raw.into_draft()?, report })
      }
      Review::Missing => Err(radar_core::Error::DraftNotFound(draft_id).into()),
      Review::NotPending(status) => Err(
        radar_core::Error::DraftNotPending(draft_id, decode_enum("status", &status)?).into(),
      ),
    }
  }

  async fn reject_draft(&self, draft_id: Uuid, note: Option<String>) -> Result<Draft> {
    let id_str = encode_uuid(draft_id);
    let at_str = encode_dt(Utc::now());

    let review = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let select = format!("SELECT {DRAFT_COLUMNS} FROM drafts WHERE draft_id = ?1");

        let Some(raw) = tx
          .query_row(&select, rusqlite::params![id_str], RawDraft::from_row)
          .optional()?
        else {
          return Ok(Review::Missing);
        };
        if raw.status != DraftStatus::Pending.as_str() {
          return Ok(Review::NotPending(raw.status));
        }

        tx.execute(
          "UPDATE drafts SET status = 'rejected', note = ?2, reviewed_at = ?3
           WHERE draft_id = ?1",
          rusqlite::params![id_str, note, at_str],
        )?;
        let raw = tx.query_row(&select, rusqlite::params![id_str], RawDraft::from_row)?;
        tx.commit()?;
        Ok(Review::Done(raw, BackfillReport::default()))
      })
      .await?;

    match review {
      Review::Done(raw, _) => raw.into_draft(),
      Review::Missing => Err(radar_core::Error::DraftNotFound(draft_id).into()),
      Review::NotPending(status) => Err(
        radar_core::Error::DraftNotPending(draft_id, decode_enum("status", &status)?).into(),
      ),
    }
  }
}

