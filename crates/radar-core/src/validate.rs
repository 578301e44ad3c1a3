//! The minimum visible-length rule for item bodies.
//!
//! Every place that authors or checks content (the store before writing, the
//! CLI before submitting) calls [`validate_content`], so they can never
//! disagree about what is acceptable.

use serde::{Deserialize, Serialize};

/// Minimum visible length of an item body.
pub const MIN_CONTENT_LENGTH: usize = 500;

/// Outcome of a content-length check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentCheck {
  pub valid:    bool,
  /// Visible length of the checked content.
  pub count:    usize,
  pub required: usize,
  /// `required - count`, floored at zero.
  pub shortage: usize,
}

/// Visible length of `content`.
///
/// Line breaks are removed first, then every whitespace run collapses to a
/// single space, then the ends are trimmed. The order matters: a `"\n "`
/// sequence between two words counts as one space, not two.
pub fn visible_length(content: &str) -> usize {
  let without_breaks: String =
    content.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();

  let mut collapsed = String::with_capacity(without_breaks.len());
  let mut in_space = false;
  for c in without_breaks.chars() {
    if c.is_whitespace() {
      if !in_space {
        collapsed.push(' ');
      }
      in_space = true;
    } else {
      collapsed.push(c);
      in_space = false;
    }
  }

  collapsed.trim().chars().count()
}

/// Check `content` against `min_length`. Pure and total: empty input has
/// length zero and is invalid for any positive minimum.
pub fn validate_content(content: &str, min_length: usize) -> ContentCheck {
  let count = visible_length(content);
  ContentCheck {
    valid: count >= min_length,
    count,
    required: min_length,
    shortage: min_length.saturating_sub(count),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn line_breaks_and_space_runs_collapse() {
    assert_eq!(visible_length("a\n\n  b   c"), "a b c".len());
    assert_eq!(visible_length("  lead and trail \t "), 14);
  }

  #[test]
  fn breaks_are_stripped_before_collapsing() {
    // A bare break joins its neighbours instead of becoming a space.
    assert_eq!(visible_length("x\ny"), 2);
    assert_eq!(visible_length("x\n y"), 3);
    assert_eq!(visible_length("x\r\ny"), 2);
  }

  #[test]
  fn empty_is_invalid() {
    let check = validate_content("", MIN_CONTENT_LENGTH);
    assert_eq!(check.count, 0);
    assert!(!check.valid);
    assert_eq!(check.shortage, MIN_CONTENT_LENGTH);
  }

  #[test]
  fn exact_boundary_is_valid() {
    let body = "가".repeat(500);
    let check = validate_content(&body, 500);
    assert!(check.valid);
    assert_eq!(check.count, 500);
    assert_eq!(check.shortage, 0);

    let check = validate_content(&body[..body.len() - "가".len()], 500);
    assert!(!check.valid);
    assert_eq!(check.shortage, 1);
  }

  #[test]
  fn padding_does_not_count() {
    let padded = format!("{}\n\n\n{}", "a".repeat(240), " ".repeat(300));
    let check = validate_content(&padded, 500);
    assert_eq!(check.count, 240);
    assert_eq!(check.shortage, 260);
  }
}
