//! Population paths for the Pitchdex at-bat index.
//!
//! Two independent strategies feed the store through the core grouper:
//!
//! - [`Rebuilder`] — full rebuild from a directory of monthly JSONL
//!   extracts, units processed in parallel and merged serially.
//! - [`Refresher`] — incremental refresh from the store's own
//!   high-water-mark, fetching only the missing window from an upstream
//!   [`PitchSource`](pitchdex_core::source::PitchSource) in calendar-month
//!   chunks.
//!
//! Both rely on the store's idempotent upsert for correctness; re-running
//! either path over data already indexed is a safe no-op.

pub mod error;
pub mod extract;
pub mod http;
pub mod rebuild;
pub mod refresh;
pub mod window;

pub use error::{Error, Result};
pub use http::{HttpPitchSource, HttpSourceConfig};
pub use rebuild::{RebuildReport, Rebuilder};
pub use refresh::{RefreshOutcome, RefreshReport, Refresher};
