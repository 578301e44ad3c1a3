//! Per-user reaction state: a liked flag and an optional personal stance.
//!
//! State is current-value only, keyed by `(user_id, item_id)`. A missing row
//! means "not liked, no stance".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{band::Stance, error::ValidationError, item::RadarItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAction {
  pub user_id:    String,
  pub item_id:    Uuid,
  pub liked:      bool,
  /// The side the user endorses, independent of the item's own stance.
  pub stance:     Option<Stance>,
  /// `None` until the user first reacts.
  pub updated_at: Option<DateTime<Utc>>,
}

impl UserAction {
  /// The state of a pair the user never touched.
  pub fn untouched(user_id: String, item_id: Uuid) -> Self {
    Self { user_id, item_id, liked: false, stance: None, updated_at: None }
  }
}

/// An item together with one user's reaction to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactedItem {
  #[serde(flatten)]
  pub item:        RadarItem,
  pub liked:       bool,
  pub user_stance: Option<Stance>,
}

/// Stance after selecting `requested` when `current` is stored: selecting the
/// stored stance again clears it, anything else replaces it.
pub fn next_stance(current: Option<Stance>, requested: Option<Stance>) -> Option<Stance> {
  if current == requested { None } else { requested }
}

/// User ids come from an external identity system; all we require is that
/// they are present.
pub fn check_user_id(user_id: &str) -> Result<(), ValidationError> {
  if user_id.trim().is_empty() {
    return Err(ValidationError::required("user_id"));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_stance_twice_clears() {
    let once = next_stance(None, Some(Stance::A));
    assert_eq!(once, Some(Stance::A));
    assert_eq!(next_stance(once, Some(Stance::A)), None);
  }

  #[test]
  fn other_stance_switches_directly() {
    assert_eq!(next_stance(Some(Stance::A), Some(Stance::B)), Some(Stance::B));
  }

  #[test]
  fn requesting_none_clears() {
    assert_eq!(next_stance(Some(Stance::B), None), None);
    assert_eq!(next_stance(None, None), None);
  }
}
