//! `radar`: command-line client for the Thoughts Radar API.
//!
//! # Usage
//!
//! ```text
//! radar today --domain tech
//! radar --user alice like 6f1c…
//! radar check essay.txt
//! radar --config ~/.config/radar/config.toml upsert item.json
//! ```

mod cache;
mod client;
mod render;

use std::{
  io::Read as _,
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context, Result, bail};
use cache::{Cache, Freshness};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use client::{ApiClient, ApiConfig};
use radar_core::{
  band::{Band, Domain, Stance},
  ingest::{BackfillReport, Draft, DraftStatus, Promotion},
  item::{ItemView, NewRadarItem, Upserted},
  reaction::{ReactedItem, UserAction},
  validate::{MIN_CONTENT_LENGTH, validate_content},
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "radar", about = "Command-line client for the Thoughts Radar")]
struct Args {
  /// Path to a TOML config file (url, user, cache_dir, timeout_secs).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the radar server (default: http://localhost:8080).
  #[arg(long, env = "RADAR_URL")]
  url: Option<String>,

  /// User id for reaction commands.
  #[arg(long, env = "RADAR_USER")]
  user: Option<String>,

  /// Where the last good read responses are kept.
  #[arg(long, env = "RADAR_CACHE_DIR", value_name = "DIR")]
  cache_dir: Option<PathBuf>,

  /// HTTP timeout in seconds (default: 10).
  #[arg(long)]
  timeout_secs: Option<u64>,

  /// Print raw JSON instead of text.
  #[arg(long)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StanceArg {
  A,
  B,
  Clear,
}

impl StanceArg {
  fn stance(self) -> Option<Stance> {
    match self {
      Self::A => Some(Stance::A),
      Self::B => Some(Stance::B),
      Self::Clear => None,
    }
  }
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Items published today.
  Today {
    #[arg(long)]
    domain: Option<Domain>,
    #[arg(long)]
    freq:   Option<String>,
  },
  /// Items published on a date (YYYY-MM-DD).
  Date {
    date:   NaiveDate,
    #[arg(long)]
    domain: Option<Domain>,
    #[arg(long)]
    freq:   Option<String>,
  },
  /// All bands.
  Bands,
  /// Toggle the like on an item.
  Like { item: Uuid },
  /// Select a stance; selecting the current one again clears it.
  Stance {
    item:   Uuid,
    #[arg(value_enum)]
    stance: StanceArg,
  },
  /// Show your reaction to an item.
  Reaction { item: Uuid },
  /// Items you liked.
  Favorites,
  /// Items you took a stance on.
  Stances,
  /// Check a text file against the minimum visible length, offline.
  Check { file: PathBuf },
  /// Publish an item from a JSON file (`-` for stdin).
  Upsert {
    file:   PathBuf,
    /// Fail instead of overwriting an existing item on the same date and band.
    #[arg(long)]
    strict: bool,
  },
  /// Publish a JSON array of items, leaving occupied slots alone.
  Backfill { file: PathBuf },
  /// List drafts.
  Drafts {
    #[arg(long)]
    status: Option<DraftStatus>,
  },
  /// Approve a pending draft.
  Approve { id: Uuid },
  /// Reject a pending draft.
  Reject {
    id:   Uuid,
    #[arg(long)]
    note: Option<String>,
  },
}

// ─── Config file ─────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
#[serde(default)]
struct ConfigFile {
  url:          Option<String>,
  user:         Option<String>,
  cache_dir:    Option<PathBuf>,
  timeout_secs: Option<u64>,
}

/// Settings after merging flags, config file and defaults.
#[derive(Debug)]
struct Settings {
  api:       ApiConfig,
  user:      Option<String>,
  cache_dir: PathBuf,
}

/// CLI flags override the config file, which overrides defaults.
fn merge(args: &Args, file: ConfigFile) -> Settings {
  let timeout_secs = args.timeout_secs.or(file.timeout_secs).unwrap_or(10);
  Settings {
    api:       ApiConfig {
      base_url: args
        .url
        .clone()
        .or(file.url)
        .unwrap_or_else(|| "http://localhost:8080".to_string()),
      timeout:  Duration::from_secs(timeout_secs.max(1)),
    },
    user:      args.user.clone().or(file.user),
    cache_dir: args
      .cache_dir
      .clone()
      .or(file.cache_dir)
      .unwrap_or_else(Cache::default_dir),
  }
}

fn read_config(path: Option<&Path>) -> Result<ConfigFile> {
  let Some(path) = path else {
    return Ok(ConfigFile::default());
  };
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading config file {}", path.display()))?;
  toml::from_str(&raw).context("parsing config file")
}

fn read_input(path: &Path) -> Result<String> {
  if path == Path::new("-") {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
    return Ok(buf);
  }
  std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

// ─── Output ──────────────────────────────────────────────────────────────────

struct Output {
  json: bool,
}

impl Output {
  fn show<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    if self.json {
      println!("{}", serde_json::to_string_pretty(value)?);
    } else {
      print!("{}", text(value));
    }
    Ok(())
  }

  fn freshness(&self, freshness: Freshness) {
    if freshness == Freshness::Cached {
      eprintln!("warning: server unavailable, showing the last cached response");
    }
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();
  let file_cfg = read_config(args.config.as_deref())?;
  let settings = merge(&args, file_cfg);
  let out = Output { json: args.json };

  // Offline command: no client needed.
  if let Command::Check { file } = &args.command {
    let check = validate_content(&read_input(file)?, MIN_CONTENT_LENGTH);
    out.show(&check, render::check)?;
    if !check.valid {
      std::process::exit(1);
    }
    return Ok(());
  }

  let client = ApiClient::new(settings.api.clone())?;
  let cache = Cache::new(settings.cache_dir.clone());
  let user = || -> Result<String> {
    match &settings.user {
      Some(u) if !u.trim().is_empty() => Ok(u.clone()),
      _ => bail!("no user id: pass --user or set RADAR_USER"),
    }
  };

  match args.command {
    Command::Check { .. } => {}

    // ── Reads (cached) ──────────────────────────────────────────────────────
    Command::Today { domain, freq } => {
      let query = filters(domain, freq);
      let (items, fresh) = cache.read::<Vec<ItemView>>(&client, "/items/today", &query).await?;
      out.freshness(fresh);
      out.show(&items, |i| render::items(i))?;
    }
    Command::Date { date, domain, freq } => {
      let mut query = vec![("date", date.to_string())];
      query.extend(filters(domain, freq));
      let (items, fresh) = cache.read::<Vec<ItemView>>(&client, "/items", &query).await?;
      out.freshness(fresh);
      out.show(&items, |i| render::items(i))?;
    }
    Command::Bands => {
      let (bands, fresh) = cache.read::<Vec<Band>>(&client, "/bands", &[]).await?;
      out.freshness(fresh);
      out.show(&bands, |b| render::bands(b))?;
    }
    Command::Reaction { item } => {
      let path = format!("/users/{}/items/{item}/reaction", user()?);
      let (state, fresh) = cache.read::<UserAction>(&client, &path, &[]).await?;
      out.freshness(fresh);
      out.show(&state, render::reaction)?;
    }
    Command::Favorites => {
      let path = format!("/users/{}/favorites", user()?);
      let (items, fresh) = cache.read::<Vec<ReactedItem>>(&client, &path, &[]).await?;
      out.freshness(fresh);
      out.show(&items, |i| render::reacted(i))?;
    }
    Command::Stances => {
      let path = format!("/users/{}/stances", user()?);
      let (items, fresh) = cache.read::<Vec<ReactedItem>>(&client, &path, &[]).await?;
      out.freshness(fresh);
      out.show(&items, |i| render::reacted(i))?;
    }
    Command::Drafts { status } => {
      let query: Vec<_> = status.map(|s| ("status", s.to_string())).into_iter().collect();
      let (drafts, fresh) = cache.read::<Vec<Draft>>(&client, "/drafts", &query).await?;
      out.freshness(fresh);
      out.show(&drafts, |d| render::drafts(d))?;
    }

    // ── Writes (never cached) ───────────────────────────────────────────────
    Command::Like { item } => {
      let path = format!("/users/{}/items/{item}/like", user()?);
      let state: serde_json::Value = client.send::<(), _>(Method::POST, &path, &[], None).await?;
      out.show(&state, |s| format!("liked={}\n", s["liked"]))?;
    }
    Command::Stance { item, stance } => {
      let path = format!("/users/{}/items/{item}/stance", user()?);
      let body = serde_json::json!({ "stance": stance.stance() });
      let state: serde_json::Value = client.send(Method::PUT, &path, &[], Some(&body)).await?;
      out.show(&state, |s| match s["stance"].as_str() {
        Some(side) => format!("stance={side}\n"),
        None => "stance cleared\n".to_owned(),
      })?;
    }
    Command::Upsert { file, strict } => {
      let input: NewRadarItem =
        serde_json::from_str(&read_input(&file)?).context("parsing item JSON")?;
      let input = input.normalize();
      if let Err(v) = input.validate(MIN_CONTENT_LENGTH) {
        match v.shortage {
          Some(n) => bail!("{} is {n} visible characters short of {MIN_CONTENT_LENGTH}", v.field),
          None => bail!("{}: {}", v.field, v.reason),
        }
      }
      let query = if strict { vec![("on_conflict", "error".to_owned())] } else { vec![] };
      let upserted: Upserted = client.send(Method::POST, "/items", &query, Some(&input)).await?;
      out.show(&upserted, |u| {
        let verb = if u.created { "created" } else { "updated" };
        format!("{verb} {} ({} {})\n", u.item.item_id, u.item.date, u.item.freq)
      })?;
    }
    Command::Backfill { file } => {
      let batch: Vec<NewRadarItem> =
        serde_json::from_str(&read_input(&file)?).context("parsing batch JSON")?;
      let report: BackfillReport =
        client.send(Method::POST, "/items/backfill", &[], Some(&batch)).await?;
      out.show(&report, render::report)?;
    }
    Command::Approve { id } => {
      let path = format!("/drafts/{id}/approve");
      let promotion: Promotion = client.send::<(), _>(Method::POST, &path, &[], None).await?;
      out.show(&promotion, |p| render::report(&p.report))?;
    }
    Command::Reject { id, note } => {
      let path = format!("/drafts/{id}/reject");
      let body = serde_json::json!({ "note": note });
      let draft: Draft = client.send(Method::POST, &path, &[], Some(&body)).await?;
      out.show(&draft, |d| format!("{} {}\n", d.draft_id, d.status))?;
    }
  }

  Ok(())
}

fn filters(domain: Option<Domain>, freq: Option<String>) -> Vec<(&'static str, String)> {
  let mut query = Vec::new();
  if let Some(d) = domain {
    query.push(("domain", d.to_string()));
  }
  if let Some(f) = freq {
    query.push(("freq", f));
  }
  query
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args(extra: &[&str]) -> Args {
    let mut argv = vec!["radar"];
    argv.extend_from_slice(extra);
    argv.push("bands");
    Args::try_parse_from(argv).unwrap()
  }

  #[test]
  fn flags_override_file_over_defaults() {
    let file = ConfigFile {
      url:          Some("http://radar.example".into()),
      user:         Some("file-user".into()),
      cache_dir:    None,
      timeout_secs: Some(3),
    };
    let merged = merge(&args(&["--user", "flag-user"]), file);
    assert_eq!(merged.api.base_url, "http://radar.example");
    assert_eq!(merged.user.as_deref(), Some("flag-user"));
    assert_eq!(merged.api.timeout, Duration::from_secs(3));
    assert_eq!(merged.cache_dir, Cache::default_dir());

    let defaults = merge(&args(&[]), ConfigFile::default());
    assert_eq!(defaults.api.base_url, "http://localhost:8080");
    assert_eq!(defaults.api.timeout, Duration::from_secs(10));
  }

  #[test]
  fn stance_argument_parses() {
    let parsed = Args::try_parse_from(["radar", "stance", &Uuid::nil().to_string(), "clear"]).unwrap();
    match parsed.command {
      Command::Stance { stance, .. } => assert_eq!(stance.stance(), None),
      other => panic!("unexpected command {other:?}"),
    }
  }

  #[test]
  fn config_file_parses() {
    let file: ConfigFile = toml::from_str("url = \"http://x\"\ntimeout_secs = 5\n").unwrap();
    assert_eq!(file.url.as_deref(), Some("http://x"));
    assert_eq!(file.timeout_secs, Some(5));
    assert!(file.user.is_none());
  }
}
