//! At-bat records — the unit the index stores and queries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::sequence::{SequenceElement, SequenceHash};

// ─── Identity ────────────────────────────────────────────────────────────────

/// The natural identity of an at-bat: the MLB game primary key plus the
/// at-bat's ordinal within that game. Unique across the whole store, never
/// reused.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize,
)]
pub struct AtBatId {
  pub game_pk:       i64,
  pub at_bat_number: u32,
}

impl AtBatId {
  pub fn new(game_pk: i64, at_bat_number: u32) -> Self {
    Self { game_pk, at_bat_number }
  }
}

// ─── Per-pitch detail ────────────────────────────────────────────────────────

/// Descriptive measurements for one pitch, index-aligned with the at-bat's
/// sequence. Measurements are optional; a pitch with no recorded speed still
/// holds its slot so pitch order is preserved end-to-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchDetail {
  /// 1-based pitch number within the at-bat.
  pub pitch_order:   u32,
  pub pitch_type:    String,
  pub outcome:       String,
  pub release_speed: Option<f64>,
  pub zone:          Option<i32>,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A fully-built at-bat ready for [`crate::store::PitchStore::upsert_atbats`].
///
/// Produced only by the grouper; `game_date` is immutable once stored and the
/// record is never mutated in place post-insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtBatRecord {
  pub id:            AtBatId,
  pub game_date:     NaiveDate,
  pub batter:        i64,
  pub pitcher:       i64,
  pub inning:        u32,
  /// Ordered by pitch number ascending; order is semantically significant.
  pub sequence:      Vec<SequenceElement>,
  pub sequence_hash: SequenceHash,
  /// Index-aligned with `sequence`.
  pub pitch_detail:  Vec<PitchDetail>,
}

/// The header columns of a stored at-bat, as returned by range and hash
/// queries. Per-pitch detail is a second lookup by identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtBatSummary {
  pub id:            AtBatId,
  pub game_date:     NaiveDate,
  pub batter:        i64,
  pub pitcher:       i64,
  pub inning:        u32,
  pub sequence_hash: SequenceHash,
}
