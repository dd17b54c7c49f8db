//! [`SqlitePitchStore`] — the SQLite implementation of [`PitchStore`].

use std::{collections::HashSet, path::Path};

use chrono::NaiveDate;
use rusqlite::OptionalExtension as _;

use pitchdex_core::{
  atbat::{AtBatId, AtBatRecord, AtBatSummary, PitchDetail},
  sequence::SequenceHash,
  store::{PitchStore, UpsertReport},
};

use crate::{
  encode::{decode_date, encode_date, RawAtBatRow, RawPitchRow},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An at-bat index backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All writes
/// funnel through the one connection, which serialises concurrent batches.
#[derive(Clone)]
pub struct SqlitePitchStore {
  conn: tokio_rusqlite::Connection,
}

impl SqlitePitchStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn summaries_where(
    &self,
    sql: &'static str,
    params: Vec<String>,
  ) -> Result<Vec<AtBatSummary>> {
    let raws: Vec<RawAtBatRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            Ok(RawAtBatRow {
              game_pk:       row.get(0)?,
              at_bat_number: row.get(1)?,
              game_date:     row.get(2)?,
              batter:        row.get(3)?,
              pitcher:       row.get(4)?,
              inning:        row.get(5)?,
              sequence_hash: row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAtBatRow::into_summary).collect()
  }
}

// ─── PitchStore impl ─────────────────────────────────────────────────────────

impl PitchStore for SqlitePitchStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn upsert_atbats(&self, records: Vec<AtBatRecord>) -> Result<UpsertReport> {
    let report = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut report = UpsertReport::default();
        {
          let mut insert_atbat = tx.prepare_cached(
            "INSERT OR IGNORE INTO atbats
               (game_pk, at_bat_number, game_date, batter, pitcher, inning,
                pitch_sequence_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          )?;
          let mut insert_pitch = tx.prepare_cached(
            "INSERT INTO pitch_sequences
               (atbat_id, pitch_order, pitch_type, description,
                release_speed, zone)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;

          for record in records {
            let changed = insert_atbat.execute(rusqlite::params![
              record.id.game_pk,
              record.id.at_bat_number,
              encode_date(record.game_date),
              record.batter,
              record.pitcher,
              record.inning,
              record.sequence_hash.as_str(),
            ])?;

            // Existing identity: first write wins, pitch rows untouched.
            if changed == 0 {
              report.ignored += 1;
              continue;
            }

            let atbat_id = tx.last_insert_rowid();
            for detail in &record.pitch_detail {
              insert_pitch.execute(rusqlite::params![
                atbat_id,
                detail.pitch_order,
                detail.pitch_type,
                detail.outcome,
                detail.release_speed,
                detail.zone,
              ])?;
            }
            report.inserted += 1;
          }
        }
        tx.commit()?;
        Ok(report)
      })
      .await?;

    Ok(report)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn atbats_in_range(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<AtBatSummary>> {
    self
      .summaries_where(
        "SELECT game_pk, at_bat_number, game_date, batter, pitcher, inning,
                pitch_sequence_hash
         FROM atbats
         WHERE game_date >= ?1 AND game_date <= ?2
         ORDER BY game_date, game_pk, at_bat_number",
        vec![encode_date(start), encode_date(end)],
      )
      .await
  }

  async fn atbats_matching_sequence(
    &self,
    hash: &SequenceHash,
  ) -> Result<Vec<AtBatSummary>> {
    self
      .summaries_where(
        "SELECT game_pk, at_bat_number, game_date, batter, pitcher, inning,
                pitch_sequence_hash
         FROM atbats
         WHERE pitch_sequence_hash = ?1
         ORDER BY game_date, game_pk, at_bat_number",
        vec![hash.as_str().to_owned()],
      )
      .await
  }

  async fn pitch_detail_for(&self, id: AtBatId) -> Result<Vec<PitchDetail>> {
    let raws: Vec<RawPitchRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.pitch_order, p.pitch_type, p.description,
                  p.release_speed, p.zone
           FROM pitch_sequences p
           JOIN atbats a ON a.id = p.atbat_id
           WHERE a.game_pk = ?1 AND a.at_bat_number = ?2
           ORDER BY p.pitch_order ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id.game_pk, id.at_bat_number], |row| {
            Ok(RawPitchRow {
              pitch_order:   row.get(0)?,
              pitch_type:    row.get(1)?,
              description:   row.get(2)?,
              release_speed: row.get(3)?,
              zone:          row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawPitchRow::into_detail).collect())
  }

  async fn max_game_date(&self) -> Result<Option<NaiveDate>> {
    let max: Option<String> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row("SELECT MAX(game_date) FROM atbats", [], |row| {
              row.get::<_, Option<String>>(0)
            })
            .optional()?
            .flatten(),
        )
      })
      .await?;

    max.as_deref().map(decode_date).transpose()
  }

  async fn atbat_ids(&self) -> Result<HashSet<AtBatId>> {
    let ids: Vec<(i64, u32)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT game_pk, at_bat_number FROM atbats")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(ids.into_iter().map(|(pk, ab)| AtBatId::new(pk, ab)).collect())
  }
}
