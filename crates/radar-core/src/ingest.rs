//! Human-in-the-loop ingestion: sources to monitor, a log of what was seen
//! from them, drafts of proposed items, and the backfill pre-filter that keeps
//! bulk producers from fighting over occupied `(date, freq)` slots.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::ValidationError,
  item::{ItemKey, NewRadarItem},
  wire::wire_names,
};

// ─── Sources ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
  Channel,
  Person,
  Publication,
}

wire_names!(SourceKind, "source kind", {
  Channel => "channel",
  Person => "person",
  Publication => "publication",
});

/// A channel, person or publication worth monitoring for content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSource {
  pub source_id:  Uuid,
  pub name:       String,
  pub kind:       SourceKind,
  pub url:        Option<String>,
  pub active:     bool,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewSource {
  pub name:   String,
  pub kind:   SourceKind,
  #[serde(default)]
  pub url:    Option<String>,
  #[serde(default = "default_true")]
  pub active: bool,
}

fn default_true() -> bool { true }

impl NewSource {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.name.trim().is_empty() {
      return Err(ValidationError::required("name"));
    }
    Ok(())
  }
}

// ─── Collection log ──────────────────────────────────────────────────────────

/// A candidate video or document seen from a source. Unique per
/// `(source_id, external_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionLogEntry {
  pub entry_id:    Uuid,
  pub source_id:   Uuid,
  /// The source platform's own id for the document, e.g. a video id.
  pub external_id: String,
  pub title:       Option<String>,
  pub url:         Option<String>,
  pub seen_at:     DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewLogEntry {
  pub source_id:   Uuid,
  pub external_id: String,
  #[serde(default)]
  pub title:       Option<String>,
  #[serde(default)]
  pub url:         Option<String>,
}

impl NewLogEntry {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.external_id.trim().is_empty() {
      return Err(ValidationError::required("external_id"));
    }
    Ok(())
  }
}

/// Result of logging an entry. Logging an already-seen document returns the
/// original entry with `newly_seen = false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logged {
  pub entry:      CollectionLogEntry,
  pub newly_seen: bool,
}

// ─── Drafts ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
  Pending,
  Approved,
  Rejected,
}

wire_names!(DraftStatus, "draft status", {
  Pending => "pending",
  Approved => "approved",
  Rejected => "rejected",
});

/// A batch of proposed items awaiting review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
  pub draft_id:    Uuid,
  pub source_id:   Option<Uuid>,
  pub entry_id:    Option<Uuid>,
  pub candidates:  Vec<NewRadarItem>,
  pub status:      DraftStatus,
  /// Reviewer's remark, usually a rejection reason.
  pub note:        Option<String>,
  pub created_at:  DateTime<Utc>,
  pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewDraft {
  #[serde(default)]
  pub source_id:  Option<Uuid>,
  #[serde(default)]
  pub entry_id:   Option<Uuid>,
  pub candidates: Vec<NewRadarItem>,
}

impl NewDraft {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.candidates.is_empty() {
      return Err(ValidationError::new("candidates", "a draft needs at least one candidate"));
    }
    Ok(())
  }
}

/// An approved draft together with what its promotion published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
  pub draft:  Draft,
  pub report: BackfillReport,
}

// ─── Backfill ────────────────────────────────────────────────────────────────

/// Why a candidate was not written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
  Invalid(ValidationError),
  UnknownBand,
}

/// A candidate the pre-filter passed over because its slot is taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skipped {
  /// Position in the input batch.
  pub index: usize,
  pub key:   ItemKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejected {
  pub index:  usize,
  pub key:    ItemKey,
  pub reason: Rejection,
}

/// The pre-filter's decision for a batch.
#[derive(Debug, Clone, Default)]
pub struct BackfillPlan {
  /// Normalised candidates to upsert, with their input positions.
  pub accepted: Vec<(usize, NewRadarItem)>,
  pub skipped:  Vec<Skipped>,
  pub rejected: Vec<Rejected>,
}

/// What a backfill wrote and what it passed over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillReport {
  pub inserted: Vec<ItemKey>,
  pub skipped:  Vec<Skipped>,
  pub rejected: Vec<Rejected>,
}

/// `freq` codes already in use, per date.
pub type Occupancy = HashMap<NaiveDate, HashSet<String>>;

/// Decide which candidates of a batch to write.
///
/// Candidates are taken in input order. Each is normalised and validated,
/// then checked against the known bands and against `occupied`. An accepted
/// candidate claims its slot, so a later candidate for the same key in the
/// same batch is skipped: first one wins.
pub fn plan_backfill(
  candidates: Vec<NewRadarItem>,
  known_bands: &HashSet<String>,
  mut occupied: Occupancy,
  min_length: usize,
) -> BackfillPlan {
  let mut plan = BackfillPlan::default();

  for (index, candidate) in candidates.into_iter().enumerate() {
    let candidate = candidate.normalize();
    let key = candidate.key();

    if let Err(e) = candidate.validate(min_length) {
      plan.rejected.push(Rejected { index, key, reason: Rejection::Invalid(e) });
      continue;
    }
    if !known_bands.contains(&candidate.freq) {
      plan.rejected.push(Rejected { index, key, reason: Rejection::UnknownBand });
      continue;
    }

    let taken = occupied.entry(candidate.date).or_default();
    if !taken.insert(candidate.freq.clone()) {
      plan.skipped.push(Skipped { index, key });
      continue;
    }

    plan.accepted.push((index, candidate));
  }

  plan
}

/// The distinct dates a batch touches, in order.
pub fn batch_dates(candidates: &[NewRadarItem]) -> Vec<NaiveDate> {
  let dates: BTreeSet<NaiveDate> = candidates.iter().map(|c| c.date).collect();
  dates.into_iter().collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::band::Stance;

  fn candidate(day: u32, freq: &str, title: &str, len: usize) -> NewRadarItem {
    NewRadarItem {
      date:          NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
      freq:          freq.into(),
      stance:        Stance::B,
      title:         title.into(),
      author_name:   "Author".into(),
      author_avatar: "A".into(),
      author_bio:    String::new(),
      source:        "Source".into(),
      source_url:    None,
      content:       "c".repeat(len),
      tension_q:     None,
      tension_a:     None,
      tension_b:     None,
      keywords:      vec![],
      video_id:      None,
    }
  }

  fn bands() -> HashSet<String> {
    ["T1", "P1"].into_iter().map(String::from).collect()
  }

  #[test]
  fn occupied_slots_are_skipped() {
    let mut occupied = Occupancy::new();
    occupied
      .entry(NaiveDate::from_ymd_opt(2026, 1, 22).unwrap())
      .or_default()
      .insert("T1".into());

    let plan = plan_backfill(
      vec![candidate(22, "T1", "taken", 600), candidate(22, "P1", "free", 600)],
      &bands(),
      occupied,
      500,
    );

    assert_eq!(plan.accepted.len(), 1);
    assert_eq!(plan.accepted[0].0, 1);
    assert_eq!(plan.skipped, vec![Skipped {
      index: 0,
      key:   ItemKey {
        date: NaiveDate::from_ymd_opt(2026, 1, 22).unwrap(),
        freq: "T1".into(),
      },
    }]);
  }

  #[test]
  fn first_candidate_for_a_key_wins() {
    let plan = plan_backfill(
      vec![
        candidate(23, "T1", "first", 600),
        candidate(23, "T1", "second", 600),
        candidate(24, "T1", "other day", 600),
      ],
      &bands(),
      Occupancy::new(),
      500,
    );

    let titles: Vec<_> = plan.accepted.iter().map(|(_, c)| c.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "other day"]);
    assert_eq!(plan.skipped.len(), 1);
    assert_eq!(plan.skipped[0].index, 1);
  }

  #[test]
  fn invalid_and_unknown_candidates_are_rejected() {
    let plan = plan_backfill(
      vec![candidate(25, "T1", "short", 480), candidate(25, "X9", "nowhere", 600)],
      &bands(),
      Occupancy::new(),
      500,
    );

    assert!(plan.accepted.is_empty());
    assert!(matches!(
      &plan.rejected[0].reason,
      Rejection::Invalid(v) if v.shortage == Some(20)
    ));
    assert_eq!(plan.rejected[1].reason, Rejection::UnknownBand);
  }

  #[test]
  fn a_rejected_candidate_does_not_claim_its_slot() {
    let plan = plan_backfill(
      vec![candidate(26, "T1", "short", 10), candidate(26, "T1", "long", 600)],
      &bands(),
      Occupancy::new(),
      500,
    );
    assert_eq!(plan.accepted.len(), 1);
    assert_eq!(plan.accepted[0].1.title, "long");
  }

  #[test]
  fn batch_dates_are_distinct_and_sorted() {
    let dates = batch_dates(&[
      candidate(3, "T1", "a", 1),
      candidate(1, "T1", "b", 1),
      candidate(3, "P1", "c", 1),
    ]);
    assert_eq!(dates, vec![
      NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
      NaiveDate::from_ymd_opt(2026, 1, 3).unwrap(),
    ]);
  }
}
