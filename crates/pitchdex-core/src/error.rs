//! Error types for `pitchdex-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("pitch row is missing required field `{0}`")]
  MissingField(&'static str),

  #[error("unparsable game_date {0:?}")]
  BadGameDate(String),

  #[error("invalid sequence hash {0:?}: expected 64 lowercase hex characters")]
  BadSequenceHash(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
