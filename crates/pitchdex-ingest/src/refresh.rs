//! Incremental, watermarked refresh.
//!
//! The refresher reads the store's high-water-mark, fetches only the missing
//! window from the upstream provider in calendar-month chunks, and merges
//! each chunk independently. It never performs the first population — an
//! empty store is reported as [`RefreshOutcome::NeedsFullRebuild`].

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

use pitchdex_core::{group, source::PitchSource, store::PitchStore};

use crate::{
  extract,
  window::{month_chunks, month_end, month_label},
  Error, Result,
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Per-run refresh counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
  pub chunks_ok:       usize,
  pub chunks_failed:   usize,
  pub atbats_inserted: usize,
  pub atbats_ignored:  usize,
}

/// What a refresh run concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
  /// The store is empty; run the full rebuild instead.
  NeedsFullRebuild,
  /// The missing window is empty or inverted — nothing to do, not an error.
  AlreadyCurrent,
  Completed(RefreshReport),
}

// ─── Refresher ───────────────────────────────────────────────────────────────

/// Drives one incremental refresh against a store and a provider.
pub struct Refresher<'a, S, P> {
  store:       &'a S,
  source:      &'a P,
  archive_dir: Option<PathBuf>,
}

impl<'a, S, P> Refresher<'a, S, P>
where
  S: PitchStore,
  P: PitchSource,
{
  pub fn new(store: &'a S, source: &'a P) -> Self {
    Self { store, source, archive_dir: None }
  }

  /// Also write each fully-fetched calendar month as an extract file under
  /// `dir`, so a later full rebuild covers the same data. Months already
  /// archived are left alone; archive failures are logged, never fatal.
  pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.archive_dir = Some(dir.into());
    self
  }

  /// Run one refresh as of `now`.
  ///
  /// `now` is an explicit parameter rather than a clock read so callers (and
  /// tests) control the upper bound, and so repeated invocations carry no
  /// hidden process-lifetime state. Running twice in succession with no new
  /// upstream data is a safe no-op by way of the store's idempotent upsert.
  ///
  /// Provider failures are per-chunk: the chunk is counted and skipped,
  /// chunks already merged stay merged. Store failures are fatal.
  pub async fn run(&self, now: NaiveDate) -> Result<RefreshOutcome> {
    let Some(high_water_mark) =
      self.store.max_game_date().await.map_err(Error::store)?
    else {
      info!("store is empty; incremental refresh cannot perform the first population");
      return Ok(RefreshOutcome::NeedsFullRebuild);
    };

    let Some(start) = high_water_mark.succ_opt() else {
      return Ok(RefreshOutcome::AlreadyCurrent);
    };
    if start > now {
      info!(%high_water_mark, "index already current");
      return Ok(RefreshOutcome::AlreadyCurrent);
    }

    let chunks = month_chunks(start, now);
    info!(%high_water_mark, %now, chunks = chunks.len(), "starting incremental refresh");

    let mut report = RefreshReport::default();
    for (chunk_start, chunk_end) in chunks {
      let rows = match self.source.fetch(chunk_start, chunk_end).await {
        Ok(rows) => rows,
        Err(e) => {
          warn!(%chunk_start, %chunk_end, error = %e, "chunk fetch failed; will retry on a later run");
          report.chunks_failed += 1;
          continue;
        }
      };

      self.archive_chunk(chunk_start, chunk_end, &rows);

      let records = group::group_raw(rows, None);
      let upserted = self
        .store
        .upsert_atbats(records)
        .await
        .map_err(Error::store)?;
      info!(
        %chunk_start,
        %chunk_end,
        inserted = upserted.inserted,
        ignored = upserted.ignored,
        "chunk merged"
      );

      report.chunks_ok += 1;
      report.atbats_inserted += upserted.inserted;
      report.atbats_ignored += upserted.ignored;
    }

    Ok(RefreshOutcome::Completed(report))
  }

  /// Archive a chunk's raw rows, full calendar months only — a partial month
  /// would shadow data an extract file of that name is expected to contain.
  fn archive_chunk(
    &self,
    chunk_start: NaiveDate,
    chunk_end: NaiveDate,
    rows: &[pitchdex_core::event::RawPitchRow],
  ) {
    let Some(dir) = &self.archive_dir else { return };
    if chunk_start.day() != 1 || chunk_end != month_end(chunk_start) {
      return;
    }

    let path = dir.join(format!(
      "{}.{}",
      month_label(chunk_start),
      extract::EXTRACT_EXTENSION
    ));
    if path.exists() {
      return;
    }

    let result = std::fs::create_dir_all(dir)
      .map_err(|source| Error::Io { path: dir.clone(), source })
      .and_then(|()| extract::write_extract(&path, rows));
    if let Err(e) = result {
      warn!(path = %path.display(), error = %e, "failed to archive chunk");
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use pitchdex_core::event::RawPitchRow;
  use pitchdex_store_sqlite::SqlitePitchStore;

  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn row(game_pk: i64, at_bat: u32, pitch: u32, game_date: &str) -> RawPitchRow {
    RawPitchRow {
      game_pk:       Some(game_pk),
      at_bat_number: Some(at_bat),
      pitch_number:  Some(pitch),
      game_date:     Some(game_date.into()),
      batter:        Some(660_271),
      pitcher:       Some(477_132),
      inning:        Some(1),
      pitch_type:    Some("FF".into()),
      description:   Some("ball".into()),
      release_speed: None,
      zone:          None,
    }
  }

  /// Canned provider: serves rows filtered by date range, with optional
  /// per-month failure injection.
  struct StaticSource {
    rows:        Vec<RawPitchRow>,
    fail_months: HashSet<String>,
  }

  impl StaticSource {
    fn new(rows: Vec<RawPitchRow>) -> Self {
      Self { rows, fail_months: HashSet::new() }
    }

    fn failing_on(mut self, label: &str) -> Self {
      self.fail_months.insert(label.into());
      self
    }
  }

  impl PitchSource for StaticSource {
    type Error = std::io::Error;

    async fn fetch(
      &self,
      start: NaiveDate,
      end: NaiveDate,
    ) -> Result<Vec<RawPitchRow>, Self::Error> {
      if self.fail_months.contains(&month_label(start)) {
        return Err(std::io::Error::other("provider unavailable"));
      }
      Ok(
        self
          .rows
          .iter()
          .filter(|r| {
            r.game_date
              .as_deref()
              .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
              .is_some_and(|d| d >= start && d <= end)
          })
          .cloned()
          .collect(),
      )
    }
  }

  async fn seeded_store(seed_date: NaiveDate) -> SqlitePitchStore {
    let store = SqlitePitchStore::open_in_memory().await.unwrap();
    let records = group::group_raw(
      vec![row(100, 1, 1, &seed_date.format("%Y-%m-%d").to_string())],
      None,
    );
    store.upsert_atbats(records).await.unwrap();
    store
  }

  #[tokio::test]
  async fn empty_store_needs_full_rebuild() {
    let store = SqlitePitchStore::open_in_memory().await.unwrap();
    let source = StaticSource::new(vec![]);

    let outcome = Refresher::new(&store, &source)
      .run(date(2024, 7, 1))
      .await
      .unwrap();
    assert_eq!(outcome, RefreshOutcome::NeedsFullRebuild);
  }

  #[tokio::test]
  async fn no_missing_window_reports_already_current() {
    let store = seeded_store(date(2024, 6, 30)).await;
    let source = StaticSource::new(vec![]);

    let outcome = Refresher::new(&store, &source)
      .run(date(2024, 6, 30))
      .await
      .unwrap();
    assert_eq!(outcome, RefreshOutcome::AlreadyCurrent);
  }

  #[tokio::test]
  async fn refresh_fetches_only_past_the_high_water_mark() {
    let store = seeded_store(date(2024, 6, 1)).await;
    let source = StaticSource::new(vec![
      row(100, 1, 1, "2024-06-01"), // already indexed
      row(200, 1, 1, "2024-06-10"),
      row(300, 1, 1, "2024-07-02"),
    ]);

    let outcome = Refresher::new(&store, &source)
      .run(date(2024, 7, 31))
      .await
      .unwrap();

    let RefreshOutcome::Completed(report) = outcome else {
      panic!("expected Completed, got {outcome:?}");
    };
    // June (from the 2nd) and July chunks.
    assert_eq!(report.chunks_ok, 2);
    assert_eq!(report.chunks_failed, 0);
    assert_eq!(report.atbats_inserted, 2);

    let all = store
      .atbats_in_range(date(2024, 1, 1), date(2024, 12, 31))
      .await
      .unwrap();
    assert_eq!(all.len(), 3);
  }

  #[tokio::test]
  async fn failed_chunk_does_not_abort_the_rest() {
    let store = seeded_store(date(2024, 5, 31)).await;
    let source = StaticSource::new(vec![
      row(200, 1, 1, "2024-06-10"),
      row(300, 1, 1, "2024-07-02"),
    ])
    .failing_on("2024-06");

    let outcome = Refresher::new(&store, &source)
      .run(date(2024, 7, 31))
      .await
      .unwrap();

    let RefreshOutcome::Completed(report) = outcome else {
      panic!("expected Completed, got {outcome:?}");
    };
    assert_eq!(report.chunks_failed, 1);
    assert_eq!(report.chunks_ok, 1);
    // July's at-bat landed despite June failing.
    assert_eq!(report.atbats_inserted, 1);
    assert_eq!(
      store.max_game_date().await.unwrap(),
      Some(date(2024, 7, 2))
    );
  }

  #[tokio::test]
  async fn immediate_rerun_is_a_safe_noop() {
    let store = seeded_store(date(2024, 6, 1)).await;
    let source = StaticSource::new(vec![row(200, 1, 1, "2024-06-10")]);
    let now = date(2024, 6, 30);

    let refresher = Refresher::new(&store, &source);
    refresher.run(now).await.unwrap();
    let before = store
      .atbats_in_range(date(2024, 1, 1), date(2024, 12, 31))
      .await
      .unwrap();

    // Second run re-fetches the tail window but inserts nothing new.
    let outcome = refresher.run(now).await.unwrap();
    let RefreshOutcome::Completed(report) = outcome else {
      panic!("expected Completed, got {outcome:?}");
    };
    assert_eq!(report.atbats_inserted, 0);

    let after = store
      .atbats_in_range(date(2024, 1, 1), date(2024, 12, 31))
      .await
      .unwrap();
    assert_eq!(before, after);
  }

  #[tokio::test]
  async fn full_months_are_archived_partial_months_are_not() {
    let store = seeded_store(date(2024, 5, 31)).await;
    let source = StaticSource::new(vec![
      row(200, 1, 1, "2024-06-10"),
      row(300, 1, 1, "2024-07-02"),
      row(400, 1, 1, "2024-08-05"),
    ]);
    let dir = tempfile::tempdir().unwrap();

    Refresher::new(&store, &source)
      .with_archive_dir(dir.path())
      .run(date(2024, 8, 15))
      .await
      .unwrap();

    assert!(dir.path().join("2024-06.jsonl").exists());
    assert!(dir.path().join("2024-07.jsonl").exists());
    // August was fetched only through the 15th.
    assert!(!dir.path().join("2024-08.jsonl").exists());

    let june = extract::read_extract(&dir.path().join("2024-06.jsonl")).unwrap();
    assert_eq!(june.len(), 1);
    assert_eq!(june[0].game_pk, Some(200));
  }
}
