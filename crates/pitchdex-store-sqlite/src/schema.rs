//! SQL schema for the Pitchdex SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per at-bat. Rows are written once and never updated; re-presenting
-- an existing (game_pk, at_bat_number) is ignored at insert time.
CREATE TABLE IF NOT EXISTS atbats (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    game_pk             INTEGER NOT NULL,
    at_bat_number       INTEGER NOT NULL,
    game_date           TEXT    NOT NULL,  -- ISO 8601 calendar date
    batter              INTEGER NOT NULL,
    pitcher             INTEGER NOT NULL,
    inning              INTEGER NOT NULL,
    pitch_sequence_hash TEXT    NOT NULL,  -- lowercase hex SHA-256
    UNIQUE (game_pk, at_bat_number)
);

-- Per-pitch detail, written only alongside its parent at-bat insert.
CREATE TABLE IF NOT EXISTS pitch_sequences (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    atbat_id      INTEGER NOT NULL REFERENCES atbats(id),
    pitch_order   INTEGER NOT NULL,
    pitch_type    TEXT    NOT NULL,
    description   TEXT    NOT NULL,
    release_speed REAL,
    zone          INTEGER
);

CREATE INDEX IF NOT EXISTS atbats_game_date_idx ON atbats(game_date);
CREATE INDEX IF NOT EXISTS atbats_seq_hash_idx  ON atbats(pitch_sequence_hash);
CREATE INDEX IF NOT EXISTS pitch_seq_atbat_idx  ON pitch_sequences(atbat_id);

PRAGMA user_version = 1;
";
