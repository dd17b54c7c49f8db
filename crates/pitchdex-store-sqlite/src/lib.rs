//! SQLite backend for the Pitchdex at-bat index.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The single connection also gives the
//! store its single-writer discipline: batches from concurrent ingest tasks
//! are applied one at a time.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqlitePitchStore;
