//! SQL schema for the radar SQLite store.
//!
//! Run in full every time a store opens. It switches the file to WAL, turns on
//! foreign-key enforcement for the connection, and creates any missing table
//! or index, so opening an existing database leaves its rows untouched.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS bands (
    freq_id   TEXT PRIMARY KEY,
    question  TEXT NOT NULL,
    side_a    TEXT NOT NULL,
    side_b    TEXT NOT NULL,
    domain    TEXT NOT NULL    -- 'tech' | 'politics' | 'history' | ...
);

-- At most one item per band per day. Writers go through
-- INSERT ... ON CONFLICT (date, freq) DO UPDATE.
CREATE TABLE IF NOT EXISTS radar_items (
    item_id        TEXT PRIMARY KEY,
    date           TEXT NOT NULL,   -- YYYY-MM-DD
    freq           TEXT NOT NULL REFERENCES bands(freq_id),
    stance         TEXT NOT NULL CHECK (stance IN ('A', 'B')),
    title          TEXT NOT NULL,
    author_name    TEXT NOT NULL,
    author_avatar  TEXT NOT NULL DEFAULT '',
    author_bio     TEXT NOT NULL DEFAULT '',
    source         TEXT NOT NULL,
    source_url     TEXT,
    content        TEXT NOT NULL,
    tension_q      TEXT,
    tension_a      TEXT,
    tension_b      TEXT,
    keywords       TEXT NOT NULL DEFAULT '[]',   -- JSON array
    video_id       TEXT,
    created_at     TEXT NOT NULL,   -- ISO 8601 UTC; never updated
    updated_at     TEXT NOT NULL,
    UNIQUE (date, freq)
);

-- Current reaction state, one row per user and item.
CREATE TABLE IF NOT EXISTS user_actions (
    user_id     TEXT NOT NULL,
    item_id     TEXT NOT NULL REFERENCES radar_items(item_id) ON DELETE CASCADE,
    liked       INTEGER NOT NULL DEFAULT 0 CHECK (liked IN (0, 1)),
    stance      TEXT CHECK (stance IN ('A', 'B')),
    updated_at  TEXT NOT NULL,
    PRIMARY KEY (user_id, item_id)
);

CREATE TABLE IF NOT EXISTS content_sources (
    source_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    kind        TEXT NOT NULL,   -- 'channel' | 'person' | 'publication'
    url         TEXT,
    active      INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS collection_log (
    entry_id     TEXT PRIMARY KEY,
    source_id    TEXT NOT NULL REFERENCES content_sources(source_id),
    external_id  TEXT NOT NULL,
    title        TEXT,
    url          TEXT,
    seen_at      TEXT NOT NULL,
    UNIQUE (source_id, external_id)
);

CREATE TABLE IF NOT EXISTS drafts (
    draft_id     TEXT PRIMARY KEY,
    source_id    TEXT REFERENCES content_sources(source_id),
    entry_id     TEXT REFERENCES collection_log(entry_id),
    candidates   TEXT NOT NULL,   -- JSON array of NewRadarItem
    status       TEXT NOT NULL DEFAULT 'pending',
    note         TEXT,
    created_at   TEXT NOT NULL,
    reviewed_at  TEXT
);

CREATE INDEX IF NOT EXISTS radar_items_date_idx   ON radar_items(date);
CREATE INDEX IF NOT EXISTS user_actions_user_idx  ON user_actions(user_id);
CREATE INDEX IF NOT EXISTS drafts_status_idx      ON drafts(status);
";
