//! Cell values: the heterogeneous contents of a table cell.

use std::{cmp::Ordering, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The value held by a single cell of a table.
///
/// Cells are typed rather than stringly so that the `Resolved` flag stays a
/// real boolean and `Timestamp` sorts chronologically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Cell {
  #[default]
  Empty,
  Text(String),
  /// A JSON integer that fits in `i64`, kept exact.
  Integer(i64),
  Number(f64),
  Bool(bool),
  Timestamp(DateTime<Utc>),
}

/// Row of cells, in header order.
pub type Row = Vec<Cell>;

/// Direction for [`crate::store::TableStore::sort_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  Ascending,
  Descending,
}

impl Cell {
  /// Convert a JSON scalar into a cell. Arrays and objects become their
  /// compact JSON text. Integers never pass through `f64`, so ids survive
  /// at full precision.
  pub fn from_json(value: &Value) -> Self {
    match value {
      Value::Null => Self::Empty,
      Value::Bool(b) => Self::Bool(*b),
      Value::Number(n) => match (n.as_i64(), n.is_f64()) {
        (Some(i), _) => Self::Integer(i),
        (None, true) => n.as_f64().map_or_else(|| Self::Text(n.to_string()), Self::Number),
        // Unsigned beyond `i64::MAX`: keep every digit.
        (None, false) => Self::Text(n.to_string()),
      },
      Value::String(s) => Self::Text(s.clone()),
      Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
    }
  }

  pub fn is_empty(&self) -> bool { matches!(self, Self::Empty) }

  /// `true` only for `Bool(true)`; the archival trigger.
  pub fn is_true(&self) -> bool { matches!(self, Self::Bool(true)) }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }

  fn kind_rank(&self) -> u8 {
    match self {
      Self::Integer(_) | Self::Number(_) => 0,
      Self::Timestamp(_) => 1,
      Self::Text(_) => 2,
      Self::Bool(_) => 3,
      Self::Empty => 4,
    }
  }

  /// Compare two non-empty cells for sorting. Cells of different kinds are
  /// ordered `Number < Timestamp < Text < Bool`; integers and floats share
  /// one numeric order.
  fn value_cmp(&self, other: &Self) -> Ordering {
    match (self, other) {
      (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
      (Self::Integer(a), Self::Number(b)) => (*a as f64).total_cmp(b),
      (Self::Number(a), Self::Integer(b)) => a.total_cmp(&(*b as f64)),
      (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
      (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
      (Self::Text(a), Self::Text(b)) => a.cmp(b),
      (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
      _ => self.kind_rank().cmp(&other.kind_rank()),
    }
  }

  /// Ordering used when sorting a range by one column. Empty cells always
  /// come last, whichever the direction.
  pub fn sort_cmp(&self, other: &Self, order: SortOrder) -> Ordering {
    match (self.is_empty(), other.is_empty()) {
      (true, true) => Ordering::Equal,
      (true, false) => Ordering::Greater,
      (false, true) => Ordering::Less,
      (false, false) => match order {
        SortOrder::Ascending => self.value_cmp(other),
        SortOrder::Descending => other.value_cmp(self),
      },
    }
  }
}

impl fmt::Display for Cell {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Empty => Ok(()),
      Self::Text(s) => f.write_str(s),
      Self::Integer(i) => write!(f, "{i}"),
      Self::Number(n) => write!(f, "{n}"),
      Self::Bool(b) => write!(f, "{b}"),
      Self::Timestamp(t) => f.write_str(&t.to_rfc3339()),
    }
  }
}

impl From<&str> for Cell {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Cell {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<bool> for Cell {
  fn from(b: bool) -> Self { Self::Bool(b) }
}

impl From<DateTime<Utc>> for Cell {
  fn from(t: DateTime<Utc>) -> Self { Self::Timestamp(t) }
}

/// Compare two rows by the cell at `column`. Rows shorter than `column` read
/// as empty there.
pub fn row_cmp(a: &Row, b: &Row, column: usize, order: SortOrder) -> Ordering {
  static EMPTY: Cell = Cell::Empty;
  let ka = a.get(column).unwrap_or(&EMPTY);
  let kb = b.get(column).unwrap_or(&EMPTY);
  ka.sort_cmp(kb, order)
}

/// Sort `rows` in place by the cell at `column`. Stable, so rows with equal
/// keys keep their relative order.
pub fn sort_rows_by(rows: &mut [Row], column: usize, order: SortOrder) {
  rows.sort_by(|a, b| row_cmp(a, b, column, order));
}
