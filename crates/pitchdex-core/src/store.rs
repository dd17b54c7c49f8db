//! The `PitchStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g.
//! `pitchdex-store-sqlite`). The ingest pipeline and the CLI depend on this
//! abstraction, not on any concrete backend.

use std::{collections::HashSet, future::Future};

use chrono::NaiveDate;

use crate::{
  atbat::{AtBatId, AtBatRecord, AtBatSummary, PitchDetail},
  sequence::SequenceHash,
};

// ─── Upsert report ───────────────────────────────────────────────────────────

/// Outcome of one [`PitchStore::upsert_atbats`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertReport {
  /// At-bats newly written, each with its full pitch detail.
  pub inserted: usize,
  /// At-bats whose identity already existed; left untouched.
  pub ignored:  usize,
}

impl UpsertReport {
  pub fn merge(&mut self, other: UpsertReport) {
    self.inserted += other.inserted;
    self.ignored += other.ignored;
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a durable at-bat index backend.
///
/// Writes are upsert-or-ignore on the natural identity
/// `(game_pk, at_bat_number)`: re-presenting a known identity is a no-op,
/// never an overwrite and never an error. Reads are unrestricted.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded tokio tasks.
pub trait PitchStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Merge a batch of records. Atomic per record: an at-bat's pitch rows are
  /// written only as part of a successful at-bat insert, so the store never
  /// holds orphan or partial pitch rows. The whole batch commits together,
  /// which makes a rebuild unit either fully merged or not at all.
  fn upsert_atbats(
    &self,
    records: Vec<AtBatRecord>,
  ) -> impl Future<Output = Result<UpsertReport, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// All at-bats with `game_date` in `[start, end]`, bounds inclusive.
  /// An empty result is a normal outcome, not an error.
  fn atbats_in_range(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Vec<AtBatSummary>, Self::Error>> + Send + '_;

  /// Exact-match lookup by sequence hash. Many at-bats may share one hash.
  fn atbats_matching_sequence<'a>(
    &'a self,
    hash: &'a SequenceHash,
  ) -> impl Future<Output = Result<Vec<AtBatSummary>, Self::Error>> + Send + 'a;

  /// Per-pitch detail for one at-bat, ordered by pitch number ascending.
  /// Empty when the identity is unknown.
  fn pitch_detail_for(
    &self,
    id: AtBatId,
  ) -> impl Future<Output = Result<Vec<PitchDetail>, Self::Error>> + Send + '_;

  /// The most recent `game_date` in the store — the incremental refresher's
  /// high-water-mark. `None` when the store is empty.
  fn max_game_date(
    &self,
  ) -> impl Future<Output = Result<Option<NaiveDate>, Self::Error>> + Send + '_;

  /// Every identity currently in the store. Used to preload the grouper's
  /// exclusion set before a rebuild; callers may skip this and rely on
  /// upsert idempotence alone.
  fn atbat_ids(
    &self,
  ) -> impl Future<Output = Result<HashSet<AtBatId>, Self::Error>> + Send + '_;
}
