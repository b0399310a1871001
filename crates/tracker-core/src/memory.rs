//! [`MemoryStore`], an in-process [`TableStore`] over plain vectors.
//!
//! Used by the test suites of every crate in the workspace, and as an
//! ephemeral backend when the server is started without a store path.

use std::{
  collections::{BTreeSet, HashMap},
  sync::{Arc, Mutex, MutexGuard},
};

use thiserror::Error;

use crate::{
  store::TableStore,
  value::{Cell, Row, SortOrder, row_cmp},
};

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("table not found: {0:?}")]
  TableNotFound(String),

  #[error("row {row} out of range for table {table:?}")]
  RowOutOfRange { table: String, row: usize },
}

#[derive(Debug, Default, Clone)]
struct Grid {
  header:     Vec<String>,
  rows:       Vec<Row>,
  /// `(row, column)` cells rendered as checkboxes.
  checkboxes: BTreeSet<(usize, usize)>,
}

/// A table store held entirely in memory.
///
/// Cloning is cheap; clones share the same tables.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
  grids: Arc<Mutex<HashMap<String, Grid>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, Grid>> {
    // A poisoned map is still structurally valid.
    self.grids.lock().unwrap_or_else(|e| e.into_inner())
  }

  fn with_grid<T>(
    &self,
    table: &str,
    f: impl FnOnce(&mut Grid) -> Result<T, MemoryError>,
  ) -> Result<T, MemoryError> {
    let mut grids = self.lock();
    let grid = grids
      .get_mut(table)
      .ok_or_else(|| MemoryError::TableNotFound(table.to_owned()))?;
    f(grid)
  }

  /// Checkbox cells of `table`, as `(row, column)` pairs.
  pub fn checkboxes(&self, table: &str) -> Vec<(usize, usize)> {
    self
      .lock()
      .get(table)
      .map(|g| g.checkboxes.iter().copied().collect())
      .unwrap_or_default()
  }

  /// Names of all tables, sorted.
  pub fn table_names(&self) -> Vec<String> {
    let mut names: Vec<_> = self.lock().keys().cloned().collect();
    names.sort();
    names
  }
}

fn out_of_range(table: &str, row: usize) -> MemoryError {
  MemoryError::RowOutOfRange { table: table.to_owned(), row }
}

/// Keep checkbox marks attached to their rows after a row was inserted or
/// deleted at `at`.
fn shift_checkboxes(set: &mut BTreeSet<(usize, usize)>, at: usize, inserted: bool) {
  *set = set
    .iter()
    .filter_map(|&(r, c)| match (inserted, r.cmp(&at)) {
      (_, std::cmp::Ordering::Less) => Some((r, c)),
      (true, _) => Some((r + 1, c)),
      (false, std::cmp::Ordering::Equal) => None,
      (false, std::cmp::Ordering::Greater) => Some((r - 1, c)),
    })
    .collect();
}

impl TableStore for MemoryStore {
  type Error = MemoryError;

  async fn create_table(&self, table: &str, header: Vec<String>) -> Result<bool, MemoryError> {
    let mut grids = self.lock();
    if grids.contains_key(table) {
      return Ok(false);
    }
    grids.insert(table.to_owned(), Grid { header, ..Grid::default() });
    Ok(true)
  }

  async fn read_header(&self, table: &str) -> Result<Option<Vec<String>>, MemoryError> {
    Ok(self.lock().get(table).map(|g| g.header.clone()))
  }

  async fn read_rows(&self, table: &str) -> Result<Vec<Row>, MemoryError> {
    Ok(self.lock().get(table).map(|g| g.rows.clone()).unwrap_or_default())
  }

  async fn write_header_cell(
    &self,
    table:  &str,
    column: usize,
    name:   String,
  ) -> Result<(), MemoryError> {
    self.with_grid(table, |g| {
      if g.header.len() <= column {
        g.header.resize(column + 1, String::new());
      }
      g.header[column] = name;
      Ok(())
    })
  }

  async fn append_row(&self, table: &str, row: Row) -> Result<usize, MemoryError> {
    self.with_grid(table, |g| {
      g.rows.push(row);
      Ok(g.rows.len() - 1)
    })
  }

  async fn insert_row(&self, table: &str, position: usize, row: Row) -> Result<(), MemoryError> {
    self.with_grid(table, |g| {
      if position > g.rows.len() {
        return Err(out_of_range(table, position));
      }
      g.rows.insert(position, row);
      shift_checkboxes(&mut g.checkboxes, position, true);
      Ok(())
    })
  }

  async fn delete_row(&self, table: &str, row: usize) -> Result<(), MemoryError> {
    self.with_grid(table, |g| {
      if row >= g.rows.len() {
        return Err(out_of_range(table, row));
      }
      g.rows.remove(row);
      shift_checkboxes(&mut g.checkboxes, row, false);
      Ok(())
    })
  }

  async fn write_cell(
    &self,
    table:  &str,
    row:    usize,
    column: usize,
    cell:   Cell,
  ) -> Result<(), MemoryError> {
    self.with_grid(table, |g| {
      let target = g.rows.get_mut(row).ok_or_else(|| out_of_range(table, row))?;
      if target.len() <= column {
        target.resize(column + 1, Cell::Empty);
      }
      target[column] = cell;
      Ok(())
    })
  }

  async fn sort_rows(
    &self,
    table:  &str,
    column: usize,
    order:  SortOrder,
  ) -> Result<(), MemoryError> {
    self.with_grid(table, |g| {
      // Checkbox marks travel with their rows.
      let mut tagged: Vec<(usize, Row)> = g.rows.drain(..).enumerate().collect();
      tagged.sort_by(|(_, a), (_, b)| row_cmp(a, b, column, order));
      let moved: HashMap<usize, usize> = tagged
        .iter()
        .enumerate()
        .map(|(new, (old, _))| (*old, new))
        .collect();
      g.checkboxes = g
        .checkboxes
        .iter()
        .map(|&(r, c)| (moved.get(&r).copied().unwrap_or(r), c))
        .collect();
      g.rows = tagged.into_iter().map(|(_, row)| row).collect();
      Ok(())
    })
  }

  async fn insert_checkbox(
    &self,
    table:  &str,
    row:    usize,
    column: usize,
  ) -> Result<(), MemoryError> {
    self.with_grid(table, |g| {
      if row >= g.rows.len() {
        return Err(out_of_range(table, row));
      }
      g.checkboxes.insert((row, column));
      Ok(())
    })
  }
}
