//! `pitchdex` — command-line surface for the at-bat pitch-sequence index.
//!
//! Reads `pitchdex.toml` (or the path given with `--config`), opens the
//! SQLite store, and exposes the two population paths plus the query
//! surface. Query results are printed as JSON, one object per line.

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use pitchdex_core::{atbat::AtBatId, sequence::SequenceHash, store::PitchStore};
use pitchdex_ingest::{
  HttpPitchSource, HttpSourceConfig, Rebuilder, RefreshOutcome, Refresher,
};
use pitchdex_store_sqlite::SqlitePitchStore;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "At-bat pitch-sequence index")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "pitchdex.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create the database file and schema, then exit.
  Init,

  /// Full rebuild from the monthly extract directory.
  Rebuild {
    /// Override the configured extract directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,
  },

  /// Incremental refresh from the store's high-water-mark.
  Refresh {
    /// Upper bound of the missing window; defaults to today (UTC).
    #[arg(long)]
    up_to: Option<NaiveDate>,
  },

  /// At-bats with game_date in [start, end], bounds inclusive.
  Range { start: NaiveDate, end: NaiveDate },

  /// At-bats whose pitch sequence hashes to exactly this digest.
  Sequence { hash: String },

  /// Per-pitch detail for one at-bat, ordered by pitch number.
  Detail { game_pk: i64, at_bat: u32 },
}

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct Settings {
  #[serde(default = "default_db_path")]
  db_path:      PathBuf,
  #[serde(default = "default_data_dir")]
  data_dir:     PathBuf,
  #[serde(default = "default_source_url")]
  source_url:   String,
  /// Per-request timeout at the provider boundary, in seconds.
  #[serde(default = "default_timeout_secs")]
  timeout_secs: u64,
  /// Extract units grouped concurrently during a rebuild.
  #[serde(default = "default_workers")]
  workers:      usize,
  /// Archive fully-fetched months into `data_dir` during a refresh.
  #[serde(default = "default_archive")]
  archive:      bool,
}

fn default_db_path() -> PathBuf { PathBuf::from("pitchdex.sqlite") }
fn default_data_dir() -> PathBuf { PathBuf::from("data/monthly") }
fn default_source_url() -> String { "http://localhost:8040".to_owned() }
fn default_timeout_secs() -> u64 { 30 }
fn default_workers() -> usize { 4 }
fn default_archive() -> bool { true }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings: Settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("PITCHDEX"))
    .build()
    .context("failed to read config")?
    .try_deserialize()
    .context("failed to deserialise settings")?;

  let store = SqlitePitchStore::open(&settings.db_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.db_path))?;

  match cli.command {
    Command::Init => {
      // `open` already created the schema.
      println!("initialised {}", settings.db_path.display());
    }

    Command::Rebuild { data_dir } => {
      let dir = data_dir.unwrap_or(settings.data_dir);
      let report = Rebuilder::new(&store)
        .with_workers(settings.workers)
        .run(&dir)
        .await
        .context("rebuild failed")?;
      println!(
        "rebuild: {} units ok, {} failed, {} at-bats inserted, {} already present",
        report.units_ok,
        report.units_failed,
        report.atbats_inserted,
        report.atbats_ignored,
      );
    }

    Command::Refresh { up_to } => {
      let source = HttpPitchSource::new(HttpSourceConfig {
        base_url: settings.source_url.clone(),
        timeout:  Duration::from_secs(settings.timeout_secs),
      })
      .context("failed to build provider client")?;

      let mut refresher = Refresher::new(&store, &source);
      if settings.archive {
        refresher = refresher.with_archive_dir(&settings.data_dir);
      }

      let now = up_to.unwrap_or_else(|| Utc::now().date_naive());
      match refresher.run(now).await.context("refresh failed")? {
        RefreshOutcome::NeedsFullRebuild => {
          anyhow::bail!("store is empty; run `pitchdex rebuild` first")
        }
        RefreshOutcome::AlreadyCurrent => println!("already current"),
        RefreshOutcome::Completed(report) => println!(
          "refresh: {} chunks ok, {} failed, {} at-bats inserted",
          report.chunks_ok, report.chunks_failed, report.atbats_inserted,
        ),
      }
    }

    Command::Range { start, end } => {
      let atbats = store
        .atbats_in_range(start, end)
        .await
        .context("range query failed")?;
      print_json_lines(&atbats)?;
    }

    Command::Sequence { hash } => {
      let hash = SequenceHash::from_hex(hash).context("invalid sequence hash")?;
      let atbats = store
        .atbats_matching_sequence(&hash)
        .await
        .context("sequence lookup failed")?;
      print_json_lines(&atbats)?;
    }

    Command::Detail { game_pk, at_bat } => {
      let detail = store
        .pitch_detail_for(AtBatId::new(game_pk, at_bat))
        .await
        .context("detail lookup failed")?;
      print_json_lines(&detail)?;
    }
  }

  Ok(())
}

/// Print each item as one JSON object per line. An empty slice prints
/// nothing — "no matches" is a normal outcome, not an error.
fn print_json_lines<T: serde::Serialize>(items: &[T]) -> anyhow::Result<()> {
  for item in items {
    println!("{}", serde_json::to_string(item).context("serialising output")?);
  }
  Ok(())
}
