//! The `PitchSource` trait — the seam to the upstream pitch-data provider.
//!
//! The provider is an external collaborator: given a date range it returns
//! zero or more raw rows. An empty result for a quiet range is normal.
//! Transient failures are the caller's business — the refresher treats a
//! failed chunk as "no data this time, retry on the next invocation".

use std::future::Future;

use chrono::NaiveDate;

use crate::event::RawPitchRow;

pub trait PitchSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch all per-pitch rows with `game_date` in `[start, end]` inclusive.
  ///
  /// Implementations must bound the call with a timeout; a hung provider
  /// must never block the pipeline indefinitely.
  fn fetch(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Vec<RawPitchRow>, Self::Error>> + Send + '_;
}
