//! HTTP implementation of [`PitchSource`].
//!
//! Speaks a plain JSON shape: `GET {base_url}/pitches?start_dt=..&end_dt=..`
//! returning an array of raw pitch rows. The per-request timeout is
//! mandatory — a hung provider must never stall the pipeline.

use std::time::Duration;

use chrono::NaiveDate;
use pitchdex_core::{event::RawPitchRow, source::PitchSource};
use reqwest::Client;

use crate::{Error, Result};

/// Connection settings for the upstream provider.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

/// Async HTTP client for the upstream pitch-data provider.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpPitchSource {
  client:   Client,
  base_url: String,
}

impl HttpPitchSource {
  pub fn new(config: HttpSourceConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_owned(),
    })
  }
}

impl PitchSource for HttpPitchSource {
  type Error = Error;

  async fn fetch(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawPitchRow>> {
    let url = format!("{}/pitches", self.base_url);
    let response = self
      .client
      .get(&url)
      .query(&[
        ("start_dt", start.format("%Y-%m-%d").to_string()),
        ("end_dt", end.format("%Y-%m-%d").to_string()),
      ])
      .send()
      .await?
      .error_for_status()?;

    Ok(response.json().await?)
  }
}
