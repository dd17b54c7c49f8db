//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as ISO 8601 (`%Y-%m-%d`) text, so SQLite's lexical
//! comparison on the `game_date` index agrees with calendar comparison.
//! Sequence hashes are stored as the lowercase hex strings they already are.

use chrono::NaiveDate;
use pitchdex_core::{
  atbat::{AtBatId, AtBatSummary, PitchDetail},
  sequence::SequenceHash,
};

use crate::{Error, Result};

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw columns read directly from an `atbats` row.
pub struct RawAtBatRow {
  pub game_pk:       i64,
  pub at_bat_number: u32,
  pub game_date:     String,
  pub batter:        i64,
  pub pitcher:       i64,
  pub inning:        u32,
  pub sequence_hash: String,
}

impl RawAtBatRow {
  pub fn into_summary(self) -> Result<AtBatSummary> {
    Ok(AtBatSummary {
      id:            AtBatId::new(self.game_pk, self.at_bat_number),
      game_date:     decode_date(&self.game_date)?,
      batter:        self.batter,
      pitcher:       self.pitcher,
      inning:        self.inning,
      sequence_hash: SequenceHash::from_hex(self.sequence_hash)?,
    })
  }
}

/// Raw columns read directly from a `pitch_sequences` row.
pub struct RawPitchRow {
  pub pitch_order:   u32,
  pub pitch_type:    String,
  pub description:   String,
  pub release_speed: Option<f64>,
  pub zone:          Option<i32>,
}

impl RawPitchRow {
  pub fn into_detail(self) -> PitchDetail {
    PitchDetail {
      pitch_order:   self.pitch_order,
      pitch_type:    self.pitch_type,
      outcome:       self.description,
      release_speed: self.release_speed,
      zone:          self.zone,
    }
  }
}
