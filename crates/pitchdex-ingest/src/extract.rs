//! Raw monthly extract files.
//!
//! One JSONL file per calendar month, named `YYYY-MM.jsonl`, one raw pitch
//! row per line. Extracts are read-only inputs to the rebuilder; the
//! refresher may additionally archive fetched chunks in this format so a
//! later full rebuild covers the same data.

use std::{
  fs::{self, File},
  io::{BufRead, BufReader, BufWriter, Write},
  path::{Path, PathBuf},
};

use pitchdex_core::event::RawPitchRow;

use crate::{Error, Result};

pub const EXTRACT_EXTENSION: &str = "jsonl";

/// All extract files directly under `dir`, sorted by file name. With the
/// `YYYY-MM` naming convention, name order is chronological order.
pub fn extract_files(dir: &Path) -> Result<Vec<PathBuf>> {
  let entries = fs::read_dir(dir).map_err(|source| Error::Io {
    path: dir.to_path_buf(),
    source,
  })?;

  let mut files: Vec<PathBuf> = entries
    .filter_map(|entry| entry.ok())
    .map(|entry| entry.path())
    .filter(|path| {
      path.is_file()
        && path
          .extension()
          .is_some_and(|ext| ext == EXTRACT_EXTENSION)
    })
    .collect();
  files.sort();
  Ok(files)
}

/// Read every row of one extract file.
///
/// A line that is not valid JSON fails the whole unit — a corrupt file is
/// skipped and reported by the caller, it does not yield a partial unit.
/// Rows that parse but are missing fields are dealt with later, at the
/// grouping boundary.
pub fn read_extract(path: &Path) -> Result<Vec<RawPitchRow>> {
  let file = File::open(path).map_err(|source| Error::Io {
    path: path.to_path_buf(),
    source,
  })?;

  let mut rows = Vec::new();
  for (index, line) in BufReader::new(file).lines().enumerate() {
    let line = line.map_err(|source| Error::Io {
      path: path.to_path_buf(),
      source,
    })?;
    if line.trim().is_empty() {
      continue;
    }
    let row = serde_json::from_str(&line).map_err(|source| Error::Parse {
      path: path.to_path_buf(),
      line: index + 1,
      source,
    })?;
    rows.push(row);
  }
  Ok(rows)
}

/// Write rows as one extract file, one JSON object per line.
pub fn write_extract(path: &Path, rows: &[RawPitchRow]) -> Result<()> {
  let io_err = |source| Error::Io { path: path.to_path_buf(), source };

  let file = File::create(path).map_err(io_err)?;
  let mut writer = BufWriter::new(file);
  for row in rows {
    let json = serde_json::to_string(row).map_err(pitchdex_core::Error::from)?;
    writer.write_all(json.as_bytes()).map_err(io_err)?;
    writer.write_all(b"\n").map_err(io_err)?;
  }
  writer.flush().map_err(io_err)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn row(game_pk: i64, pitch: u32) -> RawPitchRow {
    RawPitchRow {
      game_pk:       Some(game_pk),
      at_bat_number: Some(1),
      pitch_number:  Some(pitch),
      game_date:     Some("2024-06-01".into()),
      batter:        Some(1),
      pitcher:       Some(2),
      inning:        Some(1),
      pitch_type:    Some("FF".into()),
      description:   Some("ball".into()),
      release_speed: None,
      zone:          None,
    }
  }

  #[test]
  fn write_then_read_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("2024-06.jsonl");

    let rows = vec![row(1, 1), row(1, 2), row(2, 1)];
    write_extract(&path, &rows).unwrap();

    let read = read_extract(&path).unwrap();
    assert_eq!(read.len(), 3);
    assert_eq!(read[2].game_pk, Some(2));
  }

  #[test]
  fn corrupt_line_fails_the_unit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("2024-06.jsonl");
    fs::write(&path, "{\"game_pk\": 1}\nnot json at all\n").unwrap();

    assert!(matches!(
      read_extract(&path),
      Err(Error::Parse { line: 2, .. })
    ));
  }

  #[test]
  fn extract_files_are_sorted_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("2024-07.jsonl"), "").unwrap();
    fs::write(dir.path().join("2024-05.jsonl"), "").unwrap();
    fs::write(dir.path().join("notes.txt"), "").unwrap();
    fs::write(dir.path().join("2024-06.jsonl"), "").unwrap();

    let files = extract_files(dir.path()).unwrap();
    let names: Vec<_> = files
      .iter()
      .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
      .collect();
    assert_eq!(names, ["2024-05.jsonl", "2024-06.jsonl", "2024-07.jsonl"]);
  }
}
