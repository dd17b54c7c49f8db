//! Core types and trait definitions for the Pitchdex at-bat index.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! It owns the pure parts of the pipeline — row validation, at-bat grouping,
//! and the sequence content hash — plus the [`store::PitchStore`] and
//! [`source::PitchSource`] seams that the other crates implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod atbat;
pub mod error;
pub mod event;
pub mod group;
pub mod sequence;
pub mod source;
pub mod store;

pub use error::{Error, Result};
