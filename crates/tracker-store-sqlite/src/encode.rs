//! Encoding and decoding between domain types and the text stored in SQLite
//! columns.
//!
//! Headers, rows and checkbox sets are stored as compact JSON. Timestamps are
//! stored as RFC 3339 strings.

use chrono::{DateTime, Utc};
use tracker_core::value::Row;

use crate::Result;

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── Header ──────────────────────────────────────────────────────────────────

pub fn encode_header(header: &[String]) -> Result<String> {
  Ok(serde_json::to_string(header)?)
}

pub fn decode_header(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

// ─── Row ─────────────────────────────────────────────────────────────────────

pub fn encode_row(row: &Row) -> Result<String> { Ok(serde_json::to_string(row)?) }

pub fn decode_row(s: &str) -> Result<Row> { Ok(serde_json::from_str(s)?) }

// ─── Checkboxes ──────────────────────────────────────────────────────────────

pub fn encode_checkboxes(columns: &[usize]) -> Result<String> {
  Ok(serde_json::to_string(columns)?)
}

pub fn decode_checkboxes(s: &str) -> Result<Vec<usize>> { Ok(serde_json::from_str(s)?) }

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;
  use tracker_core::value::Cell;

  use super::*;

  #[test]
  fn rows_keep_cell_kinds() {
    let at = Utc.with_ymd_and_hms(2024, 10, 1, 13, 54, 11).unwrap();
    let row = vec![
      Cell::Bool(true),
      Cell::Empty,
      Cell::Timestamp(at),
      Cell::Number(2.5),
      Cell::from("Installation"),
    ];

    let decoded = decode_row(&encode_row(&row).unwrap()).unwrap();
    assert_eq!(decoded, row);
  }

  #[test]
  fn header_is_a_json_array() {
    let header = vec!["Resolved".to_owned(), "answers.Job_Type.value".to_owned()];
    assert_eq!(
      encode_header(&header).unwrap(),
      r#"["Resolved","answers.Job_Type.value"]"#
    );
  }

  #[test]
  fn malformed_row_is_an_error() {
    assert!(decode_row("{not json").is_err());
  }
}
