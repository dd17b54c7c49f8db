//! Full rebuild from a directory of monthly extracts.
//!
//! Units are disjoint in time, so grouping them is embarrassingly parallel;
//! the merge into the store stays serial, one transaction per unit, which is
//! what makes mid-flight cancellation safe (a unit either fully merges or
//! not at all). Because the merge is upsert-or-ignore on identity, the final
//! store content does not depend on the order units happen to finish in.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use tokio::task::JoinSet;
use tracing::{info, warn};

use pitchdex_core::{atbat::AtBatRecord, group, store::PitchStore};

use crate::{extract, Error, Result};

/// Per-run rebuild counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildReport {
  pub units_ok:        usize,
  pub units_failed:    usize,
  pub atbats_inserted: usize,
  /// Identities re-presented by overlapping units or a pre-populated store.
  pub atbats_ignored:  usize,
}

/// Drives one full rebuild of a store from an extract corpus.
pub struct Rebuilder<'a, S> {
  store:   &'a S,
  workers: usize,
}

impl<'a, S: PitchStore> Rebuilder<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store, workers: 4 } }

  /// Cap on extract units grouped concurrently.
  pub fn with_workers(mut self, workers: usize) -> Self {
    self.workers = workers.max(1);
    self
  }

  /// Rebuild from every `*.jsonl` unit under `data_dir`.
  ///
  /// A unit that fails to load or parse is skipped and counted; it never
  /// aborts the rebuild of other units. Store failures are fatal.
  pub async fn run(&self, data_dir: &Path) -> Result<RebuildReport> {
    let files = extract::extract_files(data_dir)?;
    info!(units = files.len(), dir = %data_dir.display(), "starting full rebuild");

    // Identities already indexed: lets workers skip regrouping known
    // at-bats. Purely an optimisation — upsert would ignore them anyway.
    let known = Arc::new(self.store.atbat_ids().await.map_err(Error::store)?);

    let mut report = RebuildReport::default();
    let mut tasks: JoinSet<(PathBuf, Result<Vec<AtBatRecord>>)> = JoinSet::new();
    let mut pending = files.into_iter();

    loop {
      // Keep up to `workers` units grouping in parallel.
      while tasks.len() < self.workers {
        let Some(path) = pending.next() else { break };
        let known = Arc::clone(&known);
        tasks.spawn_blocking(move || {
          let result = extract::read_extract(&path)
            .map(|rows| group::group_raw(rows, Some(known.as_ref())));
          (path, result)
        });
      }

      let Some(joined) = tasks.join_next().await else { break };
      let (path, result) = joined?;

      match result {
        Ok(records) => {
          let upserted = self
            .store
            .upsert_atbats(records)
            .await
            .map_err(Error::store)?;
          info!(
            unit = %path.display(),
            inserted = upserted.inserted,
            ignored = upserted.ignored,
            "unit merged"
          );
          report.units_ok += 1;
          report.atbats_inserted += upserted.inserted;
          report.atbats_ignored += upserted.ignored;
        }
        Err(e) => {
          warn!(unit = %path.display(), error = %e, "skipping unreadable unit");
          report.units_failed += 1;
        }
      }
    }

    info!(
      units_ok = report.units_ok,
      units_failed = report.units_failed,
      inserted = report.atbats_inserted,
      ignored = report.atbats_ignored,
      "rebuild finished"
    );
    Ok(report)
  }
}
