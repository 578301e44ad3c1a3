//! Plain-text rendering of API responses.

use radar_core::{
  band::{Band, Stance},
  ingest::{BackfillReport, Draft, Rejection},
  item::ItemView,
  reaction::{ReactedItem, UserAction},
  validate::ContentCheck,
};

fn stance_letter(stance: Option<Stance>) -> &'static str {
  match stance {
    Some(Stance::A) => "A",
    Some(Stance::B) => "B",
    None => "-",
  }
}

pub fn items(items: &[ItemView]) -> String {
  if items.is_empty() {
    return "no items\n".into();
  }
  let mut out = String::new();
  for view in items {
    let item = &view.item;
    out.push_str(&format!("[{}] {} ({})\n", item.freq, view.tension.question, view.domain));
    out.push_str(&format!(
      "     {}: \"{}\" by {}, {}\n",
      item.stance,
      item.title,
      item.author_name,
      view.tension.side(item.stance)
    ));
    out.push_str(&format!("     id {}\n", item.item_id));
  }
  out
}

pub fn bands(bands: &[Band]) -> String {
  let mut out = String::new();
  for band in bands {
    out.push_str(&format!(
      "{:<4} {:<10} {}\n     A: {}\n     B: {}\n",
      band.freq_id, band.domain, band.question, band.side_a, band.side_b
    ));
  }
  out
}

pub fn reacted(items: &[ReactedItem]) -> String {
  if items.is_empty() {
    return "nothing yet\n".into();
  }
  let mut out = String::new();
  for r in items {
    out.push_str(&format!(
      "{} [{}] {}  liked={} stance={}\n",
      r.item.date,
      r.item.freq,
      r.item.title,
      if r.liked { "yes" } else { "no" },
      stance_letter(r.user_stance),
    ));
  }
  out
}

pub fn reaction(state: &UserAction) -> String {
  format!(
    "liked={} stance={}\n",
    if state.liked { "yes" } else { "no" },
    stance_letter(state.stance)
  )
}

pub fn check(check: &ContentCheck) -> String {
  if check.valid {
    format!("ok: {} visible characters (minimum {})\n", check.count, check.required)
  } else {
    format!(
      "too short: {} visible characters, {} more needed (minimum {})\n",
      check.count, check.shortage, check.required
    )
  }
}

pub fn report(report: &BackfillReport) -> String {
  let mut out = format!(
    "inserted {}, skipped {}, rejected {}\n",
    report.inserted.len(),
    report.skipped.len(),
    report.rejected.len()
  );
  for s in &report.skipped {
    out.push_str(&format!("  skipped #{} {} {}: slot taken\n", s.index, s.key.date, s.key.freq));
  }
  for r in &report.rejected {
    let why = match &r.reason {
      Rejection::Invalid(v) => match v.shortage {
        Some(n) => format!("{}: {} by {n}", v.field, v.reason),
        None => format!("{}: {}", v.field, v.reason),
      },
      Rejection::UnknownBand => "unknown band".to_owned(),
    };
    out.push_str(&format!("  rejected #{} {} {}: {why}\n", r.index, r.key.date, r.key.freq));
  }
  out
}

pub fn drafts(drafts: &[Draft]) -> String {
  if drafts.is_empty() {
    return "no drafts\n".into();
  }
  let mut out = String::new();
  for d in drafts {
    out.push_str(&format!(
      "{} {:<8} {} candidate(s), created {}\n",
      d.draft_id,
      d.status,
      d.candidates.len(),
      d.created_at.format("%Y-%m-%d %H:%M")
    ));
  }
  out
}

#[cfg(test)]
mod tests {
  use radar_core::validate::validate_content;

  use super::*;

  #[test]
  fn short_content_shows_shortage() {
    let text = check(&validate_content(&"x".repeat(480), 500));
    assert!(text.contains("20 more needed"), "{text}");
  }

  #[test]
  fn empty_lists_say_so() {
    assert_eq!(items(&[]), "no items\n");
    assert_eq!(drafts(&[]), "no drafts\n");
  }
}
