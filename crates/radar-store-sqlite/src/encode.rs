//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as
//! `YYYY-MM-DD`, so lexical order is chronological. Enums are stored as their
//! wire spelling. Keyword lists and draft candidates are stored as compact
//! JSON. UUIDs are stored as hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use radar_core::{
  band::{Band, Stance},
  ingest::{CollectionLogEntry, ContentSource, Draft},
  item::{NewRadarItem, RadarItem},
  reaction::ReactedItem,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

/// Parse a column through the enum's `FromStr`.
pub fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::UnknownValue { column, value: s.to_owned() })
}

pub fn encode_keywords(keywords: &[String]) -> Result<String> {
  Ok(serde_json::to_string(keywords)?)
}

pub fn decode_keywords(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Items ───────────────────────────────────────────────────────────────────

/// Column values of a `radar_items` row, ready to bind.
#[derive(Debug, Clone)]
pub struct ItemParams {
  pub item_id:       String,
  pub date:          String,
  pub freq:          String,
  pub stance:        &'static str,
  pub title:         String,
  pub author_name:   String,
  pub author_avatar: String,
  pub author_bio:    String,
  pub source:        String,
  pub source_url:    Option<String>,
  pub content:       String,
  pub tension_q:     Option<String>,
  pub tension_a:     Option<String>,
  pub tension_b:     Option<String>,
  pub keywords:      String,
  pub video_id:      Option<String>,
  pub now:           String,
}

impl ItemParams {
  /// Bind `input` under a freshly generated id. The id is only used if the
  /// row turns out to be new.
  pub fn new(input: NewRadarItem, now: DateTime<Utc>) -> Result<Self> {
    Ok(Self {
      item_id:       encode_uuid(Uuid::new_v4()),
      date:          encode_date(input.date),
      freq:          input.freq,
      stance:        encode_stance(input.stance),
      title:         input.title,
      author_name:   input.author_name,
      author_avatar: input.author_avatar,
      author_bio:    input.author_bio,
      source:        input.source,
      source_url:    input.source_url,
      content:       input.content,
      tension_q:     input.tension_q,
      tension_a:     input.tension_a,
      tension_b:     input.tension_b,
      keywords:      encode_keywords(&input.keywords)?,
      video_id:      input.video_id,
      now:           encode_dt(now),
    })
  }
}

pub fn encode_stance(s: Stance) -> &'static str { s.as_str() }

/// The column list every item query selects, in [`RawItem::from_row`] order.
pub const ITEM_COLUMNS: &str = "i.item_id, i.date, i.freq, i.stance, i.title, \
   i.author_name, i.author_avatar, i.author_bio, i.source, i.source_url, \
   i.content, i.tension_q, i.tension_a, i.tension_b, i.keywords, i.video_id, \
   i.created_at, i.updated_at";

/// Number of columns in [`ITEM_COLUMNS`].
pub const ITEM_COLUMN_COUNT: usize = 18;

/// Raw strings read directly from a `radar_items` row.
pub struct RawItem {
  pub item_id:       String,
  pub date:          String,
  pub freq:          String,
  pub stance:        String,
  pub title:         String,
  pub author_name:   String,
  pub author_avatar: String,
  pub author_bio:    String,
  pub source:        String,
  pub source_url:    Option<String>,
  pub content:       String,
  pub tension_q:     Option<String>,
  pub tension_a:     Option<String>,
  pub tension_b:     Option<String>,
  pub keywords:      String,
  pub video_id:      Option<String>,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawItem {
  /// Read the [`ITEM_COLUMNS`] block starting at column 0.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:       row.get(0)?,
      date:          row.get(1)?,
      freq:          row.get(2)?,
      stance:        row.get(3)?,
      title:         row.get(4)?,
      author_name:   row.get(5)?,
      author_avatar: row.get(6)?,
      author_bio:    row.get(7)?,
      source:        row.get(8)?,
      source_url:    row.get(9)?,
      content:       row.get(10)?,
      tension_q:     row.get(11)?,
      tension_a:     row.get(12)?,
      tension_b:     row.get(13)?,
      keywords:      row.get(14)?,
      video_id:      row.get(15)?,
      created_at:    row.get(16)?,
      updated_at:    row.get(17)?,
    })
  }

  pub fn into_item(self) -> Result<RadarItem> {
    Ok(RadarItem {
      item_id:       decode_uuid(&self.item_id)?,
      date:          decode_date(&self.date)?,
      freq:          self.freq,
      stance:        decode_enum("stance", &self.stance)?,
      title:         self.title,
      author_name:   self.author_name,
      author_avatar: self.author_avatar,
      author_bio:    self.author_bio,
      source:        self.source,
      source_url:    self.source_url,
      content:       self.content,
      tension_q:     self.tension_q,
      tension_a:     self.tension_a,
      tension_b:     self.tension_b,
      keywords:      decode_keywords(&self.keywords)?,
      video_id:      self.video_id,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Bands ───────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `bands` row.
pub struct RawBand {
  pub freq_id:  String,
  pub question: String,
  pub side_a:   String,
  pub side_b:   String,
  pub domain:   String,
}

impl RawBand {
  /// Read five band columns starting at `offset`.
  pub fn from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      freq_id:  row.get(offset)?,
      question: row.get(offset + 1)?,
      side_a:   row.get(offset + 2)?,
      side_b:   row.get(offset + 3)?,
      domain:   row.get(offset + 4)?,
    })
  }

  pub fn into_band(self) -> Result<Band> {
    Ok(Band {
      freq_id:  self.freq_id,
      question: self.question,
      side_a:   self.side_a,
      side_b:   self.side_b,
      domain:   decode_enum("domain", &self.domain)?,
    })
  }
}

// ─── Reactions ───────────────────────────────────────────────────────────────

/// An item row followed by the `liked` and `stance` columns of a reaction.
pub struct RawReactedItem {
  pub item:   RawItem,
  pub liked:  bool,
  pub stance: Option<String>,
}

impl RawReactedItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item:   RawItem::from_row(row)?,
      liked:  row.get(ITEM_COLUMN_COUNT)?,
      stance: row.get(ITEM_COLUMN_COUNT + 1)?,
    })
  }

  pub fn into_reacted(self) -> Result<ReactedItem> {
    Ok(ReactedItem {
      item:        self.item.into_item()?,
      liked:       self.liked,
      user_stance: self
        .stance
        .as_deref()
        .map(|s| decode_enum("stance", s))
        .transpose()?,
    })
  }
}

// ─── Sources and log ─────────────────────────────────────────────────────────

pub struct RawSource {
  pub source_id:  String,
  pub name:       String,
  pub kind:       String,
  pub url:        Option<String>,
  pub active:     bool,
  pub created_at: String,
}

impl RawSource {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      source_id:  row.get(0)?,
      name:       row.get(1)?,
      kind:       row.get(2)?,
      url:        row.get(3)?,
      active:     row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_source(self) -> Result<ContentSource> {
    Ok(ContentSource {
      source_id:  decode_uuid(&self.source_id)?,
      name:       self.name,
      kind:       decode_enum("kind", &self.kind)?,
      url:        self.url,
      active:     self.active,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawLogEntry {
  pub entry_id:    String,
  pub source_id:   String,
  pub external_id: String,
  pub title:       Option<String>,
  pub url:         Option<String>,
  pub seen_at:     String,
}

impl RawLogEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:    row.get(0)?,
      source_id:   row.get(1)?,
      external_id: row.get(2)?,
      title:       row.get(3)?,
      url:         row.get(4)?,
      seen_at:     row.get(5)?,
    })
  }

  pub fn into_entry(self) -> Result<CollectionLogEntry> {
    Ok(CollectionLogEntry {
      entry_id:    decode_uuid(&self.entry_id)?,
      source_id:   decode_uuid(&self.source_id)?,
      external_id: self.external_id,
      title:       self.title,
      url:         self.url,
      seen_at:     decode_dt(&self.seen_at)?,
    })
  }
}

// ─── Drafts ──────────────────────────────────────────────────────────────────

pub fn encode_candidates(candidates: &[NewRadarItem]) -> Result<String> {
  Ok(serde_json::to_string(candidates)?)
}

pub struct RawDraft {
  pub draft_id:    String,
  pub source_id:   Option<String>,
  pub entry_id:    Option<String>,
  pub candidates:  String,
  pub status:      String,
  pub note:        Option<String>,
  pub created_at:  String,
  pub reviewed_at: Option<String>,
}

impl RawDraft {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      draft_id:    row.get(0)?,
      source_id:   row.get(1)?,
      entry_id:    row.get(2)?,
      candidates:  row.get(3)?,
      status:      row.get(4)?,
      note:        row.get(5)?,
      created_at:  row.get(6)?,
      reviewed_at: row.get(7)?,
    })
  }

  pub fn into_draft(self) -> Result<Draft> {
    let candidates: Vec<NewRadarItem> = serde_json::from_str(&self.candidates)?;
    Ok(Draft {
      draft_id:    decode_uuid(&self.draft_id)?,
      source_id:   self.source_id.as_deref().map(decode_uuid).transpose()?,
      entry_id:    self.entry_id.as_deref().map(decode_uuid).transpose()?,
      candidates,
      status:      decode_enum("status", &self.status)?,
      note:        self.note,
      created_at:  decode_dt(&self.created_at)?,
      reviewed_at: self.reviewed_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use radar_core::{band::Domain, ingest::DraftStatus};

  #[test]
  fn dates_sort_lexically() {
    let a = encode_date(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    let b = encode_date(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
    assert_eq!(a, "2025-12-31");
    assert!(a < b);
    assert_eq!(decode_date(&b).unwrap(), NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
  }

  #[test]
  fn enum_columns_round_trip_and_reject_unknowns() {
    assert_eq!(decode_enum::<Domain>("domain", "religion").unwrap(), Domain::Religion);
    assert_eq!(decode_enum::<DraftStatus>("status", "approved").unwrap(), DraftStatus::Approved);
    assert_eq!(decode_enum::<Stance>("stance", encode_stance(Stance::B)).unwrap(), Stance::B);
    assert!(matches!(
      decode_enum::<Domain>("domain", "sports"),
      Err(Error::UnknownValue { column: "domain", .. })
    ));
  }
}
