//! Raw pitch rows and the validated [`PitchEvent`] they become.
//!
//! Upstream rows arrive with every field optional — extract files and the
//! provider feed are both best-effort. Validation happens exactly once, at
//! this boundary: identity fields are required, descriptive measurements are
//! optional-with-default. Nothing downstream re-parses a field.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Raw boundary row ────────────────────────────────────────────────────────

/// One per-pitch row exactly as it comes off the wire or out of an extract
/// file. Field names match the upstream Statcast column names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPitchRow {
  pub game_pk:       Option<i64>,
  pub at_bat_number: Option<u32>,
  pub pitch_number:  Option<u32>,
  /// ISO 8601 calendar date, e.g. `"2024-06-01"`.
  pub game_date:     Option<String>,
  pub batter:        Option<i64>,
  pub pitcher:       Option<i64>,
  pub inning:        Option<u32>,
  pub pitch_type:    Option<String>,
  pub description:   Option<String>,
  pub release_speed: Option<f64>,
  pub zone:          Option<i32>,
}

impl RawPitchRow {
  /// Validate this row into a [`PitchEvent`].
  ///
  /// Identity and at-bat-level fields are required; a missing one rejects
  /// the whole row. `pitch_type` and `description` fall back to the
  /// [`UNKNOWN_CODE`](crate::sequence::UNKNOWN_CODE) sentinel downstream, so
  /// they stay optional here. Measurements are passed through as-is.
  pub fn validate(self) -> Result<PitchEvent> {
    let date_str = self.game_date.ok_or(Error::MissingField("game_date"))?;
    let game_date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
      .map_err(|_| Error::BadGameDate(date_str))?;

    Ok(PitchEvent {
      game_pk:       self.game_pk.ok_or(Error::MissingField("game_pk"))?,
      at_bat_number: self
        .at_bat_number
        .ok_or(Error::MissingField("at_bat_number"))?,
      pitch_number:  self
        .pitch_number
        .ok_or(Error::MissingField("pitch_number"))?,
      game_date,
      batter:        self.batter.ok_or(Error::MissingField("batter"))?,
      pitcher:       self.pitcher.ok_or(Error::MissingField("pitcher"))?,
      inning:        self.inning.ok_or(Error::MissingField("inning"))?,
      pitch_type:    self.pitch_type,
      description:   self.description,
      release_speed: self.release_speed,
      zone:          self.zone,
    })
  }
}

// ─── Validated event ─────────────────────────────────────────────────────────

/// A validated per-pitch row. Consumed transiently by the grouper; never
/// persisted in this form.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchEvent {
  pub game_pk:       i64,
  pub at_bat_number: u32,
  pub pitch_number:  u32,
  pub game_date:     NaiveDate,
  pub batter:        i64,
  pub pitcher:       i64,
  pub inning:        u32,
  pub pitch_type:    Option<String>,
  pub description:   Option<String>,
  pub release_speed: Option<f64>,
  pub zone:          Option<i32>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn full_row() -> RawPitchRow {
    RawPitchRow {
      game_pk:       Some(716_463),
      at_bat_number: Some(12),
      pitch_number:  Some(3),
      game_date:     Some("2024-06-01".into()),
      batter:        Some(660_271),
      pitcher:       Some(477_132),
      inning:        Some(4),
      pitch_type:    Some("FF".into()),
      description:   Some("called_strike".into()),
      release_speed: Some(97.4),
      zone:          Some(5),
    }
  }

  #[test]
  fn valid_row_passes() {
    let event = full_row().validate().unwrap();
    assert_eq!(event.game_pk, 716_463);
    assert_eq!(event.game_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
  }

  #[test]
  fn missing_identity_field_rejects_row() {
    let mut row = full_row();
    row.at_bat_number = None;
    assert!(matches!(
      row.validate(),
      Err(Error::MissingField("at_bat_number"))
    ));
  }

  #[test]
  fn unparsable_date_rejects_row() {
    let mut row = full_row();
    row.game_date = Some("June 1st".into());
    assert!(matches!(row.validate(), Err(Error::BadGameDate(_))));
  }

  #[test]
  fn missing_measurements_are_fine() {
    let mut row = full_row();
    row.pitch_type = None;
    row.release_speed = None;
    row.zone = None;
    let event = row.validate().unwrap();
    assert!(event.pitch_type.is_none());
    assert!(event.release_speed.is_none());
  }
}
