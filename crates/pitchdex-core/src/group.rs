//! Grouping raw per-pitch rows into per-at-bat records.
//!
//! A batch of rows in arbitrary order becomes one [`AtBatRecord`] per
//! distinct `(game_pk, at_bat_number)` pair. The policy is omission over
//! corruption: a row that fails validation is logged and dropped, and a run
//! whose rows all fail simply produces no record — never a record with fewer
//! pitches than were actually thrown.

use std::collections::HashSet;

use tracing::warn;

use crate::{
  atbat::{AtBatId, AtBatRecord, PitchDetail},
  event::{PitchEvent, RawPitchRow},
  sequence::{self, SequenceElement, UNKNOWN_CODE},
};

/// Validate a batch of raw rows and group the survivors into at-bat records.
///
/// Malformed rows (missing identity fields, unparsable dates) are warned
/// about and excluded; everything else flows into [`group_events`].
pub fn group_raw(
  rows: Vec<RawPitchRow>,
  exclude: Option<&HashSet<AtBatId>>,
) -> Vec<AtBatRecord> {
  let total = rows.len();
  let events: Vec<PitchEvent> = rows
    .into_iter()
    .filter_map(|row| match row.validate() {
      Ok(event) => Some(event),
      Err(e) => {
        warn!(error = %e, "dropping malformed pitch row");
        None
      }
    })
    .collect();

  if events.len() < total {
    warn!(dropped = total - events.len(), total, "some pitch rows were malformed");
  }

  group_events(events, exclude)
}

/// Group validated pitch events into at-bat records.
///
/// Rows are stable-sorted by `(game_pk, at_bat_number, pitch_number)` and
/// partitioned into contiguous runs sharing an identity. At-bat-level fields
/// are taken from the first row of each run; if rows within a run disagree,
/// the first row wins and the discrepancy is not treated as fatal. The
/// output order of records is unspecified.
///
/// `exclude` skips identities already present in the destination store. This
/// is an optimisation only — the store's upsert is idempotent regardless.
pub fn group_events(
  mut events: Vec<PitchEvent>,
  exclude: Option<&HashSet<AtBatId>>,
) -> Vec<AtBatRecord> {
  events.sort_by(|a, b| {
    (a.game_pk, a.at_bat_number, a.pitch_number)
      .cmp(&(b.game_pk, b.at_bat_number, b.pitch_number))
  });

  let mut records = Vec::new();
  let mut run: Vec<PitchEvent> = Vec::new();

  for event in events {
    if let Some(first) = run.first()
      && (first.game_pk, first.at_bat_number)
        != (event.game_pk, event.at_bat_number)
    {
      if let Some(record) = build_record(std::mem::take(&mut run), exclude) {
        records.push(record);
      }
    }
    run.push(event);
  }
  if let Some(record) = build_record(run, exclude) {
    records.push(record);
  }

  records
}

/// Build one record from a run of events sharing an identity.
/// Returns `None` for an empty run or an excluded identity.
fn build_record(
  run: Vec<PitchEvent>,
  exclude: Option<&HashSet<AtBatId>>,
) -> Option<AtBatRecord> {
  let first = run.first()?;
  let id = AtBatId::new(first.game_pk, first.at_bat_number);

  if exclude.is_some_and(|set| set.contains(&id)) {
    return None;
  }

  let game_date = first.game_date;
  let batter = first.batter;
  let pitcher = first.pitcher;
  let inning = first.inning;

  let mut elements = Vec::with_capacity(run.len());
  let mut detail = Vec::with_capacity(run.len());
  for event in run {
    let pitch_type = event
      .pitch_type
      .unwrap_or_else(|| UNKNOWN_CODE.to_owned());
    let outcome = event
      .description
      .unwrap_or_else(|| UNKNOWN_CODE.to_owned());

    elements.push(SequenceElement::new(&pitch_type, &outcome));
    detail.push(PitchDetail {
      pitch_order: event.pitch_number,
      pitch_type,
      outcome,
      release_speed: event.release_speed,
      zone: event.zone,
    });
  }

  let sequence_hash = sequence::encode_sequence(&elements);

  Some(AtBatRecord {
    id,
    game_date,
    batter,
    pitcher,
    inning,
    sequence: elements,
    sequence_hash,
    pitch_detail: detail,
  })
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn event(game_pk: i64, ab: u32, pitch: u32) -> PitchEvent {
    PitchEvent {
      game_pk,
      at_bat_number: ab,
      pitch_number: pitch,
      game_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
      batter: 660_271,
      pitcher: 477_132,
      inning: 4,
      pitch_type: Some("FF".into()),
      description: Some("ball".into()),
      release_speed: Some(95.0),
      zone: Some(5),
    }
  }

  fn raw(game_pk: i64, ab: u32, pitch: u32) -> RawPitchRow {
    RawPitchRow {
      game_pk:       Some(game_pk),
      at_bat_number: Some(ab),
      pitch_number:  Some(pitch),
      game_date:     Some("2024-06-01".into()),
      batter:        Some(660_271),
      pitcher:       Some(477_132),
      inning:        Some(4),
      pitch_type:    Some("FF".into()),
      description:   Some("ball".into()),
      release_speed: None,
      zone:          None,
    }
  }

  #[test]
  fn one_record_per_identity_with_all_pitches() {
    // 5 rows across 2 at-bats, deliberately shuffled.
    let events = vec![
      event(1, 2, 2),
      event(1, 1, 1),
      event(1, 2, 1),
      event(1, 1, 3),
      event(1, 1, 2),
    ];

    let mut records = group_events(events, None);
    records.sort_by_key(|r| r.id);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, AtBatId::new(1, 1));
    assert_eq!(records[0].sequence.len(), 3);
    assert_eq!(records[1].sequence.len(), 2);

    let total: usize = records.iter().map(|r| r.pitch_detail.len()).sum();
    assert_eq!(total, 5);
  }

  #[test]
  fn pitch_order_is_preserved() {
    let mut first = event(7, 1, 1);
    first.pitch_type = Some("FF".into());
    first.description = Some("called_strike".into());
    let mut second = event(7, 1, 2);
    second.pitch_type = Some("SL".into());
    second.description = Some("foul".into());
    let mut third = event(7, 1, 3);
    third.pitch_type = Some("CH".into());
    third.description = Some("hit_into_play".into());

    // Feed in reverse; grouping must restore pitch order.
    let records = group_events(vec![third, first, second], None);
    assert_eq!(records.len(), 1);

    let types: Vec<_> = records[0]
      .sequence
      .iter()
      .map(|el| el.pitch_type.as_str())
      .collect();
    assert_eq!(types, ["FF", "SL", "CH"]);

    let orders: Vec<_> = records[0]
      .pitch_detail
      .iter()
      .map(|d| d.pitch_order)
      .collect();
    assert_eq!(orders, [1, 2, 3]);
    assert_eq!(records[0].sequence.len(), records[0].pitch_detail.len());
  }

  #[test]
  fn hash_matches_codec_over_same_sequence() {
    let records = group_events(vec![event(3, 1, 1), event(3, 1, 2)], None);
    let expected = sequence::encode_sequence(&records[0].sequence);
    assert_eq!(records[0].sequence_hash, expected);
  }

  #[test]
  fn first_row_wins_on_disagreement() {
    let a = event(9, 1, 1);
    let mut b = event(9, 1, 2);
    b.batter = 999_999;
    b.inning = 8;

    let records = group_events(vec![b, a.clone()], None);
    assert_eq!(records.len(), 1);
    // Row with pitch_number 1 sorts first, so its fields win.
    assert_eq!(records[0].batter, a.batter);
    assert_eq!(records[0].inning, a.inning);
  }

  #[test]
  fn missing_codes_become_sentinel() {
    let mut e = event(4, 1, 1);
    e.pitch_type = None;
    e.description = None;

    let records = group_events(vec![e], None);
    assert_eq!(records[0].sequence[0].pitch_type, UNKNOWN_CODE);
    assert_eq!(records[0].sequence[0].outcome, UNKNOWN_CODE);
    // Sentinel still participates in the hash like any other code.
    assert_eq!(
      records[0].sequence_hash,
      sequence::encode_sequence(&records[0].sequence)
    );
  }

  #[test]
  fn excluded_identities_are_skipped() {
    let exclude: HashSet<AtBatId> = [AtBatId::new(1, 1)].into();
    let events = vec![event(1, 1, 1), event(1, 2, 1)];

    let records = group_events(events, Some(&exclude));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, AtBatId::new(1, 2));
  }

  #[test]
  fn empty_input_is_empty_output() {
    assert!(group_events(vec![], None).is_empty());
    assert!(group_raw(vec![], None).is_empty());
  }

  #[test]
  fn malformed_rows_are_dropped_not_emitted() {
    let good = raw(1, 1, 1);
    let mut bad = raw(1, 2, 1);
    bad.game_date = Some("tomorrow".into());
    let mut also_bad = raw(1, 2, 2);
    also_bad.game_pk = None;

    // At-bat (1,2) loses every row, so it must be absent — not emitted as a
    // partial record.
    let records = group_raw(vec![good, bad, also_bad], None);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, AtBatId::new(1, 1));
  }
}
