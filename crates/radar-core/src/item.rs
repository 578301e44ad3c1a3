//! Radar items: curated opinion entries, one per band per day.
//!
//! The pair `(date, freq)` is unique. Producers never insert blindly; they go
//! through the store's upsert, which overwrites every mutable field of an
//! existing item on the same key and leaves its identity untouched.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  band::{Band, Domain, Stance},
  error::ValidationError,
  validate::validate_content,
};

// ─── Key ─────────────────────────────────────────────────────────────────────

/// The uniqueness key of a radar item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
  pub date: NaiveDate,
  pub freq: String,
}

// ─── NewRadarItem ────────────────────────────────────────────────────────────

/// Input to the store's upsert, insert and backfill operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewRadarItem {
  pub date:          NaiveDate,
  pub freq:          String,
  /// The side of the band's debate this item argues for.
  pub stance:        Stance,
  pub title:         String,
  pub author_name:   String,
  /// Initials shown in place of a portrait.
  #[serde(default)]
  pub author_avatar: String,
  #[serde(default)]
  pub author_bio:    String,
  /// Citation string, e.g. a publication and year.
  pub source:        String,
  #[serde(default)]
  pub source_url:    Option<String>,
  pub content:       String,
  /// Item-specific framing; falls back to the band's when absent.
  #[serde(default)]
  pub tension_q:     Option<String>,
  #[serde(default)]
  pub tension_a:     Option<String>,
  #[serde(default)]
  pub tension_b:     Option<String>,
  #[serde(default)]
  pub keywords:      Vec<String>,
  /// Link back to an ingested video, if the item came from one.
  #[serde(default)]
  pub video_id:      Option<String>,
}

impl NewRadarItem {
  pub fn key(&self) -> ItemKey {
    ItemKey { date: self.date, freq: self.freq.clone() }
  }

  /// Canonicalise the payload. Deterministic, so normalising an already
  /// normalised item is a no-op.
  pub fn normalize(mut self) -> Self {
    fn trim(s: &mut String) {
      let t = s.trim();
      if t.len() != s.len() {
        *s = t.to_owned();
      }
    }
    fn blank_to_none(s: Option<String>) -> Option<String> {
      s.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
    }

    trim(&mut self.freq);
    trim(&mut self.title);
    trim(&mut self.author_name);
    trim(&mut self.author_avatar);
    trim(&mut self.author_bio);
    trim(&mut self.source);

    if self.author_avatar.is_empty() {
      self.author_avatar = self
        .author_name
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default();
    }

    self.source_url = blank_to_none(self.source_url);
    self.tension_q = blank_to_none(self.tension_q);
    self.tension_a = blank_to_none(self.tension_a);
    self.tension_b = blank_to_none(self.tension_b);
    self.video_id = blank_to_none(self.video_id);

    let mut keywords: Vec<String> = Vec::with_capacity(self.keywords.len());
    for kw in self.keywords.drain(..) {
      let kw = kw.trim();
      if !kw.is_empty() && !keywords.iter().any(|k| k == kw) {
        keywords.push(kw.to_owned());
      }
    }
    self.keywords = keywords;

    self
  }

  /// Build the stored form of this input.
  pub fn into_item(
    self,
    item_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
  ) -> RadarItem {
    RadarItem {
      item_id,
      date: self.date,
      freq: self.freq,
      stance: self.stance,
      title: self.title,
      author_name: self.author_name,
      author_avatar: self.author_avatar,
      author_bio: self.author_bio,
      source: self.source,
      source_url: self.source_url,
      content: self.content,
      tension_q: self.tension_q,
      tension_a: self.tension_a,
      tension_b: self.tension_b,
      keywords: self.keywords,
      video_id: self.video_id,
      created_at,
      updated_at,
    }
  }

  /// Check required fields, then the content-length rule.
  pub fn validate(&self, min_length: usize) -> Result<(), ValidationError> {
    for (field, value) in [
      ("freq", &self.freq),
      ("title", &self.title),
      ("author_name", &self.author_name),
      ("source", &self.source),
    ] {
      if value.trim().is_empty() {
        return Err(ValidationError::required(field));
      }
    }

    let check = validate_content(&self.content, min_length);
    if !check.valid {
      return Err(ValidationError::too_short("content", check.shortage));
    }
    Ok(())
  }
}

// ─── RadarItem ───────────────────────────────────────────────────────────────

/// A published item as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarItem {
  /// Assigned on first insert; later upserts on the same key keep it.
  pub item_id:       Uuid,
  pub date:          NaiveDate,
  pub freq:          String,
  pub stance:        Stance,
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
  pub keywords:      Vec<String>,
  pub video_id:      Option<String>,
  pub created_at:    DateTime<Utc>,
  /// Bumped by every overwrite.
  pub updated_at:    DateTime<Utc>,
}

impl RadarItem {
  pub fn key(&self) -> ItemKey {
    ItemKey { date: self.date, freq: self.freq.clone() }
  }

  /// Whether the stored content fields equal `input` (identity and
  /// timestamps are ignored).
  pub fn matches(&self, input: &NewRadarItem) -> bool {
    self.date == input.date
      && self.freq == input.freq
      && self.stance == input.stance
      && self.title == input.title
      && self.author_name == input.author_name
      && self.author_avatar == input.author_avatar
      && self.author_bio == input.author_bio
      && self.source == input.source
      && self.source_url == input.source_url
      && self.content == input.content
      && self.tension_q == input.tension_q
      && self.tension_a == input.tension_a
      && self.tension_b == input.tension_b
      && self.keywords == input.keywords
      && self.video_id == input.video_id
  }
}

/// Result of an upsert. `created` is false when an existing item on the same
/// key was overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upserted {
  pub item:    RadarItem,
  pub created: bool,
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// The question-and-answers framing shown with an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tension {
  pub question: String,
  pub side_a:   String,
  pub side_b:   String,
}

impl Tension {
  /// The item's own framing, field by field, falling back to the band's.
  pub fn resolve(item: &RadarItem, band: &Band) -> Self {
    Self {
      question: item.tension_q.clone().unwrap_or_else(|| band.question.clone()),
      side_a:   item.tension_a.clone().unwrap_or_else(|| band.side_a.clone()),
      side_b:   item.tension_b.clone().unwrap_or_else(|| band.side_b.clone()),
    }
  }

  /// The label of the given side.
  pub fn side(&self, stance: Stance) -> &str {
    match stance {
      Stance::A => &self.side_a,
      Stance::B => &self.side_b,
    }
  }
}

/// An item joined with its band, as returned by date reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemView {
  #[serde(flatten)]
  pub item:    RadarItem,
  pub domain:  Domain,
  pub tension: Tension,
}

impl ItemView {
  pub fn new(item: RadarItem, band: &Band) -> Self {
    let tension = Tension::resolve(&item, band);
    Self { item, domain: band.domain, tension }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> NewRadarItem {
    NewRadarItem {
      date:          NaiveDate::from_ymd_opt(2026, 1, 22).unwrap(),
      freq:          " T1 ".into(),
      stance:        Stance::A,
      title:         "Title".into(),
      author_name:   "ada lovelace".into(),
      author_avatar: String::new(),
      author_bio:    String::new(),
      source:        "Notes, 1843".into(),
      source_url:    Some("   ".into()),
      content:       "x".repeat(520),
      tension_q:     None,
      tension_a:     Some("Machines only follow".into()),
      tension_b:     None,
      keywords:      vec!["ai".into(), " ai ".into(), "".into(), "history".into()],
      video_id:      None,
    }
  }

  #[test]
  fn normalize_is_idempotent() {
    let once = sample().normalize();
    assert_eq!(once.freq, "T1");
    assert_eq!(once.author_avatar, "A");
    assert_eq!(once.source_url, None);
    assert_eq!(once.keywords, vec!["ai", "history"]);
    assert_eq!(once.clone().normalize(), once);
  }

  #[test]
  fn validate_reports_shortage() {
    let mut item = sample().normalize();
    item.content = "y".repeat(480);
    let err = item.validate(500).unwrap_err();
    assert_eq!(err, ValidationError::too_short("content", 20));
    assert_eq!(err.reason, "too_short");
  }

  #[test]
  fn validate_requires_title() {
    let mut item = sample().normalize();
    item.title = " ".into();
    let err = item.validate(500).unwrap_err();
    assert_eq!(err, ValidationError::required("title"));
  }

  #[test]
  fn unknown_fields_are_rejected() {
    let json = serde_json::json!({
      "date": "2026-01-22", "freq": "T1", "stance": "A", "title": "t",
      "author_name": "a", "source": "s", "content": "c", "mood": "sunny"
    });
    assert!(serde_json::from_value::<NewRadarItem>(json).is_err());
  }

  #[test]
  fn tension_falls_back_per_field() {
    let band = Band {
      freq_id:  "T1".into(),
      question: "Can machines think?".into(),
      side_a:   "No".into(),
      side_b:   "Yes".into(),
      domain:   Domain::Tech,
    };
    let input = sample().normalize();
    let now = Utc::now();
    let item = input.clone().into_item(Uuid::new_v4(), now, now);
    assert!(item.matches(&input));

    let view = ItemView::new(item, &band);
    assert_eq!(view.tension.question, "Can machines think?");
    assert_eq!(view.tension.side(Stance::A), "Machines only follow");
    assert_eq!(view.tension.side(Stance::B), "Yes");
    assert_eq!(view.domain, Domain::Tech);
  }
}
