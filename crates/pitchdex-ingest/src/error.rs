//! Error type for `pitchdex-ingest`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] pitchdex_core::Error),

  /// The persistence layer failed. Fatal for the current run — partial state
  /// is safe because each unit merges in its own transaction.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The upstream provider failed for one chunk. Handled per chunk, never
  /// escalated to a whole-pipeline abort.
  #[error("source error: {0}")]
  Source(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("reading {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed extract {path:?} (line {line}): {source}")]
  Parse {
    path:   PathBuf,
    line:   usize,
    #[source]
    source: serde_json::Error,
  },

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("background task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

impl Error {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub fn source(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Source(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
