//! The `TableStore` trait: the grid-like backing store every pipeline writes
//! through.
//!
//! The trait is implemented by storage backends (`MemoryStore` in this crate,
//! `tracker-store-sqlite`). The pipelines depend only on this capability
//! surface, never on a concrete engine.
//!
//! Row indices are zero-based positions within a table's data region; the
//! header is not counted. Column indices are zero-based header positions.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::value::{Cell, Row, SortOrder};

// ─── Table kinds ─────────────────────────────────────────────────────────────

/// The five logical tables the tracker maintains. The configured store-level
/// name of each is looked up through [`crate::config::TrackerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableKind {
  Panel,
  Electrical,
  ResolvedPanel,
  ResolvedElectrical,
  Summary,
}

impl TableKind {
  /// Active tables, in the order archival visits them.
  pub const ACTIVE: [TableKind; 2] = [TableKind::Panel, TableKind::Electrical];

  /// Archive tables, in the order archival sorts them.
  pub const ARCHIVE: [TableKind; 2] =
    [TableKind::ResolvedPanel, TableKind::ResolvedElectrical];

  pub fn is_active(self) -> bool { Self::ACTIVE.contains(&self) }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Header and data rows of a table, read in one go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
  pub name:   String,
  pub header: Vec<String>,
  pub rows:   Vec<Row>,
}

impl TableSnapshot {
  /// Position of the first column named `name`.
  pub fn position(&self, name: &str) -> Option<usize> {
    self.header.iter().position(|h| h == name)
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a tabular store of named grids.
///
/// All methods return `Send` futures so the trait can be used from a
/// multi-threaded runtime (tokio with `axum`).
pub trait TableStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Tables ────────────────────────────────────────────────────────────

  /// Create `table` with `header` unless it already exists. Returns `true`
  /// when the table was created; an existing table is left untouched.
  fn create_table<'a>(
    &'a self,
    table: &'a str,
    header: Vec<String>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// The header row of `table`, or `None` if the table does not exist.
  fn read_header<'a>(
    &'a self,
    table: &'a str,
  ) -> impl Future<Output = Result<Option<Vec<String>>, Self::Error>> + Send + 'a;

  /// Every data row of `table`, top to bottom. Missing tables read as empty.
  fn read_rows<'a>(
    &'a self,
    table: &'a str,
  ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send + 'a;

  /// Write the header cell at `column`, padding the header with empty names
  /// if it is shorter.
  fn write_header_cell<'a>(
    &'a self,
    table: &'a str,
    column: usize,
    name: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Rows ──────────────────────────────────────────────────────────────

  /// Append `row` below the last data row and return its index.
  fn append_row<'a>(
    &'a self,
    table: &'a str,
    row: Row,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Insert `row` at `position`, shifting that row and those below it down.
  fn insert_row<'a>(
    &'a self,
    table: &'a str,
    position: usize,
    row: Row,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete the data row at `row`, shifting those below it up.
  fn delete_row<'a>(
    &'a self,
    table: &'a str,
    row: usize,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Overwrite one cell, padding the row with empty cells if it is shorter.
  fn write_cell<'a>(
    &'a self,
    table: &'a str,
    row: usize,
    column: usize,
    cell: Cell,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Sort the data region by the cell at `column`. The sort is stable.
  fn sort_rows<'a>(
    &'a self,
    table: &'a str,
    column: usize,
    order: SortOrder,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Presentation ──────────────────────────────────────────────────────

  /// Render one cell as a checkbox control. Backends without a notion of
  /// cell presentation keep the default no-op.
  fn insert_checkbox<'a>(
    &'a self,
    _table: &'a str,
    _row: usize,
    _column: usize,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a {
    async { Ok(()) }
  }
}
