//! The pitch sequence and its content hash.
//!
//! A sequence is the ordered list of `(pitch_type, outcome)` pairs thrown
//! during one at-bat. Its hash is the exact-match lookup key for "find every
//! at-bat whose sequence was X", so the encoding is fixed by contract:
//! element count as u32 LE, then for each element the length-prefixed UTF-8
//! bytes of `pitch_type` followed by the length-prefixed bytes of `outcome`.
//! SHA-256 over that byte string, lowercase hex.
//!
//! Order is semantically significant — two sequences with the same elements
//! in different orders hash differently. Many at-bats may legitimately share
//! one hash (every four-pitch walk looks alike); the mapping is many-to-one
//! by design.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Sentinel stored in place of a missing pitch type or outcome code.
///
/// The codec hashes whatever codes flow through it, sentinel included; what
/// counts as "missing" is decided upstream at the grouping boundary.
pub const UNKNOWN_CODE: &str = "UNK";

// ─── Sequence element ────────────────────────────────────────────────────────

/// One pitch as it participates in sequence identity: the pitch type code
/// (e.g. `FF`, `SL`) and the outcome code (e.g. `called_strike`, `foul`).
/// Only these two fields feed the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceElement {
  pub pitch_type: String,
  pub outcome:    String,
}

impl SequenceElement {
  pub fn new(pitch_type: impl Into<String>, outcome: impl Into<String>) -> Self {
    Self { pitch_type: pitch_type.into(), outcome: outcome.into() }
  }
}

// ─── Sequence hash ───────────────────────────────────────────────────────────

/// A SHA-256 digest of a canonically serialised sequence, as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceHash(String);

impl SequenceHash {
  /// Accept a caller-supplied hex digest (e.g. from a CLI argument).
  pub fn from_hex(s: impl Into<String>) -> Result<Self> {
    let s = s.into();
    let valid = s.len() == 64
      && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if !valid {
      return Err(Error::BadSequenceHash(s));
    }
    Ok(Self(s))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SequenceHash {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Codec ───────────────────────────────────────────────────────────────────

/// Compute the content hash of an ordered sequence.
///
/// Pure and deterministic: the same ordered elements always produce the same
/// digest, across processes, platforms, and pipeline runs. Length-prefixing
/// makes the serialisation unambiguous — `("FF", "ball")` can never collide
/// with `("FFb", "all")`.
pub fn encode_sequence(elements: &[SequenceElement]) -> SequenceHash {
  let mut hasher = Sha256::new();
  hasher.update((elements.len() as u32).to_le_bytes());
  for el in elements {
    hasher.update((el.pitch_type.len() as u32).to_le_bytes());
    hasher.update(el.pitch_type.as_bytes());
    hasher.update((el.outcome.len() as u32).to_le_bytes());
    hasher.update(el.outcome.as_bytes());
  }
  SequenceHash(hex::encode(hasher.finalize()))
}
