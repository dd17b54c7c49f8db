//! Calendar-month windowing for fetch and rebuild units.
//!
//! Both population paths work in coarse monthly chunks: monthly fetch windows
//! bound per-request payload size and allow partial progress, and monthly
//! extract files are the rebuild corpus convention.

use chrono::{Datelike, Days, NaiveDate};

/// The `YYYY-MM` label naming a month's chunk and its extract file.
pub fn month_label(d: NaiveDate) -> String {
  format!("{:04}-{:02}", d.year(), d.month())
}

/// The last day of `d`'s calendar month.
pub fn month_end(d: NaiveDate) -> NaiveDate {
  let (year, month) = if d.month() == 12 {
    (d.year() + 1, 1)
  } else {
    (d.year(), d.month() + 1)
  };
  // The 1st of the following month always exists, as does the day before it.
  NaiveDate::from_ymd_opt(year, month, 1)
    .and_then(|first| first.checked_sub_days(Days::new(1)))
    .unwrap_or(d)
}

/// Split `[start, end]` into inclusive chunks that never cross a month
/// boundary. The first and last chunks may be partial months. Empty when
/// `start > end`.
pub fn month_chunks(start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
  let mut chunks = Vec::new();
  let mut cursor = start;
  while cursor <= end {
    let chunk_end = month_end(cursor).min(end);
    chunks.push((cursor, chunk_end));
    match chunk_end.checked_add_days(Days::new(1)) {
      Some(next) => cursor = next,
      None => break,
    }
  }
  chunks
}
