//! Bands ("frequencies"): the fixed taxonomy of debate axes items attach to.

use serde::{Deserialize, Serialize};

use crate::{error::ValidationError, wire::wire_names};

/// Which side of a band's debate something supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
  A,
  B,
}

/// Subject area a band belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
  Tech,
  Politics,
  History,
  Philosophy,
  Religion,
  Finance,
}

wire_names!(Stance, "stance", { A => "A", B => "B" });

wire_names!(Domain, "domain", {
  Tech => "tech",
  Politics => "politics",
  History => "history",
  Philosophy => "philosophy",
  Religion => "religion",
  Finance => "finance",
});

/// One debate axis: a framing question and two opposing positions.
///
/// `freq_id` is the primary key; once items reference it, it never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Band {
  /// Short code such as `T1` or `Φ2`.
  pub freq_id:  String,
  pub question: String,
  pub side_a:   String,
  pub side_b:   String,
  pub domain:   Domain,
}

impl Band {
  pub fn validate(&self) -> Result<(), ValidationError> {
    for (field, value) in [
      ("freq_id", &self.freq_id),
      ("question", &self.question),
      ("side_a", &self.side_a),
      ("side_b", &self.side_b),
    ] {
      if value.trim().is_empty() {
        return Err(ValidationError::required(field));
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn enums_use_wire_spelling() {
    assert_eq!(serde_json::to_string(&Domain::Philosophy).unwrap(), "\"philosophy\"");
    assert_eq!(serde_json::to_string(&Stance::B).unwrap(), "\"B\"");
    assert_eq!("finance".parse::<Domain>().unwrap(), Domain::Finance);
    assert_eq!(Domain::Tech.as_str(), "tech");
    assert_eq!(format!("{:<6}|", Stance::A), "A     |");
    assert!("astrology".parse::<Domain>().is_err());
    assert!("C".parse::<Stance>().is_err());
  }

  #[test]
  fn blank_framing_is_rejected() {
    let band = Band {
      freq_id:  "T1".into(),
      question: "  ".into(),
      side_a:   "yes".into(),
      side_b:   "no".into(),
      domain:   Domain::Tech,
    };
    assert_eq!(band.validate().unwrap_err().field, "question");
  }
}
