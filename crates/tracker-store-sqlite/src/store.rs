//! [`SqliteStore`], the SQLite implementation of [`TableStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, Transaction};

use tracker_core::{
  store::TableStore,
  value::{Cell, Row, SortOrder, row_cmp},
};

use crate::{
  Error, Result,
  encode::{
    decode_checkboxes, decode_header, decode_row, encode_checkboxes, encode_dt, encode_header,
    encode_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A table store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; nothing survives the process.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` inside a transaction on the connection thread. The transaction
  /// commits only when `f` succeeds.
  async fn transact<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let out = f(&tx);
        if out.is_ok() {
          tx.commit()?;
        }
        Ok(out)
      })
      .await?
  }

  /// Checkbox cells of `table`, as `(row, column)` pairs in row order.
  pub async fn checkboxes(&self, table: &str) -> Result<Vec<(usize, usize)>> {
    let table = table.to_owned();
    self
      .transact(move |tx| {
        let mut stmt = tx.prepare(
          "SELECT position, checkboxes FROM grid_rows
           WHERE grid = ?1 AND checkboxes != '[]'
           ORDER BY position",
        )?;
        let raws = stmt
          .query_map(rusqlite::params![table], |r| {
            Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::new();
        for (position, raw) in raws {
          for column in decode_checkboxes(&raw)? {
            out.push((position as usize, column));
          }
        }
        Ok(out)
      })
      .await
  }

  /// Names of all tables, sorted.
  pub async fn table_names(&self) -> Result<Vec<String>> {
    self
      .transact(|tx| {
        let mut stmt = tx.prepare("SELECT name FROM grids ORDER BY name")?;
        let names = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
      })
      .await
  }
}

// ─── Statement helpers ───────────────────────────────────────────────────────

fn header_of(conn: &Connection, table: &str) -> Result<Option<Vec<String>>> {
  let raw: Option<String> = conn
    .query_row(
      "SELECT header FROM grids WHERE name = ?1",
      rusqlite::params![table],
      |r| r.get(0),
    )
    .optional()?;
  raw.as_deref().map(decode_header).transpose()
}

fn require_header(conn: &Connection, table: &str) -> Result<Vec<String>> {
  header_of(conn, table)?.ok_or_else(|| Error::TableNotFound(table.to_owned()))
}

fn row_count(conn: &Connection, table: &str) -> Result<usize> {
  let n: i64 = conn.query_row(
    "SELECT COUNT(*) FROM grid_rows WHERE grid = ?1",
    rusqlite::params![table],
    |r| r.get(0),
  )?;
  Ok(n as usize)
}

/// `(id, payload)` of the row at `position`, where `column` names which
/// payload column to fetch.
fn row_at(
  conn: &Connection,
  table: &str,
  position: usize,
  column: &'static str,
) -> Result<(i64, String)> {
  let sql = format!("SELECT id, {column} FROM grid_rows WHERE grid = ?1 AND position = ?2");
  conn
    .query_row(&sql, rusqlite::params![table, position as i64], |r| {
      Ok((r.get(0)?, r.get(1)?))
    })
    .optional()?
    .ok_or_else(|| Error::RowOutOfRange { table: table.to_owned(), row: position })
}

/// Move every row at or below `from` by `delta` positions.
fn shift_rows(conn: &Connection, table: &str, from: usize, delta: i64) -> Result<()> {
  conn.execute(
    "UPDATE grid_rows SET position = position + ?3 WHERE grid = ?1 AND position >= ?2",
    rusqlite::params![table, from as i64, delta],
  )?;
  Ok(())
}

fn insert_at(conn: &Connection, table: &str, position: usize, row: &Row) -> Result<()> {
  conn.execute(
    "INSERT INTO grid_rows (grid, position, cells) VALUES (?1, ?2, ?3)",
    rusqlite::params![table, position as i64, encode_row(row)?],
  )?;
  Ok(())
}

// ─── TableStore impl ─────────────────────────────────────────────────────────

impl TableStore for SqliteStore {
  type Error = Error;

  // ── Tables ────────────────────────────────────────────────────────────────

  async fn create_table(&self, table: &str, header: Vec<String>) -> Result<bool> {
    let table = table.to_owned();
    let header = encode_header(&header)?;
    let at = encode_dt(Utc::now());

    self
      .transact(move |tx| {
        let changed = tx.execute(
          "INSERT OR IGNORE INTO grids (name, header, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![table, header, at],
        )?;
        Ok(changed == 1)
      })
      .await
  }

  async fn read_header(&self, table: &str) -> Result<Option<Vec<String>>> {
    let table = table.to_owned();
    self.transact(move |tx| header_of(tx, &table)).await
  }

  async fn read_rows(&self, table: &str) -> Result<Vec<Row>> {
    let table = table.to_owned();
    self
      .transact(move |tx| {
        let mut stmt =
          tx.prepare("SELECT cells FROM grid_rows WHERE grid = ?1 ORDER BY position")?;
        let raws = stmt
          .query_map(rusqlite::params![table], |r| r.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.iter().map(|raw| decode_row(raw)).collect()
      })
      .await
  }

  async fn write_header_cell(&self, table: &str, column: usize, name: String) -> Result<()> {
    let table = table.to_owned();
    self
      .transact(move |tx| {
        let mut header = require_header(tx, &table)?;
        if header.len() <= column {
          header.resize(column + 1, String::new());
        }
        header[column] = name;
        tx.execute(
          "UPDATE grids SET header = ?2 WHERE name = ?1",
          rusqlite::params![table, encode_header(&header)?],
        )?;
        Ok(())
      })
      .await
  }

  // ── Rows ──────────────────────────────────────────────────────────────────

  async fn append_row(&self, table: &str, row: Row) -> Result<usize> {
    let table = table.to_owned();
    self
      .transact(move |tx| {
        require_header(tx, &table)?;
        let position = row_count(tx, &table)?;
        insert_at(tx, &table, position, &row)?;
        Ok(position)
      })
      .await
  }

  async fn insert_row(&self, table: &str, position: usize, row: Row) -> Result<()> {
    let table = table.to_owned();
    self
      .transact(move |tx| {
        require_header(tx, &table)?;
        if position > row_count(tx, &table)? {
          return Err(Error::RowOutOfRange { table, row: position });
        }
        shift_rows(tx, &table, position, 1)?;
        insert_at(tx, &table, position, &row)
      })
      .await
  }

  async fn delete_row(&self, table: &str, row: usize) -> Result<()> {
    let table = table.to_owned();
    self
      .transact(move |tx| {
        require_header(tx, &table)?;
        let (id, _) = row_at(tx, &table, row, "cells")?;
        tx.execute("DELETE FROM grid_rows WHERE id = ?1", rusqlite::params![id])?;
        shift_rows(tx, &table, row + 1, -1)
      })
      .await
  }

  async fn write_cell(&self, table: &str, row: usize, column: usize, cell: Cell) -> Result<()> {
    let table = table.to_owned();
    self
      .transact(move |tx| {
        require_header(tx, &table)?;
        let (id, raw) = row_at(tx, &table, row, "cells")?;
        let mut cells = decode_row(&raw)?;
        if cells.len() <= column {
          cells.resize(column + 1, Cell::Empty);
        }
        cells[column] = cell;
        tx.execute(
          "UPDATE grid_rows SET cells = ?2 WHERE id = ?1",
          rusqlite::params![id, encode_row(&cells)?],
        )?;
        Ok(())
      })
      .await
  }

  async fn sort_rows(&self, table: &str, column: usize, order: SortOrder) -> Result<()> {
    let table = table.to_owned();
    self
      .transact(move |tx| {
        require_header(tx, &table)?;

        let mut stmt =
          tx.prepare("SELECT id, cells FROM grid_rows WHERE grid = ?1 ORDER BY position")?;
        let raws = stmt
          .query_map(rusqlite::params![table], |r| {
            Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        drop(stmt);

        let mut rows = raws
          .into_iter()
          .map(|(id, raw)| Ok((id, decode_row(&raw)?)))
          .collect::<Result<Vec<(i64, Row)>>>()?;
        // `sort_by` is stable, so ties keep their relative order.
        rows.sort_by(|(_, a), (_, b)| row_cmp(a, b, column, order));

        // Checkbox sets live on the row record, so they travel with it.
        let mut update = tx.prepare("UPDATE grid_rows SET position = ?2 WHERE id = ?1")?;
        for (position, (id, _)) in rows.iter().enumerate() {
          update.execute(rusqlite::params![id, position as i64])?;
        }
        Ok(())
      })
      .await
  }

  // ── Presentation ──────────────────────────────────────────────────────────

  async fn insert_checkbox(&self, table: &str, row: usize, column: usize) -> Result<()> {
    let table = table.to_owned();
    self
      .transact(move |tx| {
        require_header(tx, &table)?;
        let (id, raw) = row_at(tx, &table, row, "checkboxes")?;
        let mut columns = decode_checkboxes(&raw)?;
        if !columns.contains(&column) {
          columns.push(column);
          columns.sort_unstable();
        }
        tx.execute(
          "UPDATE grid_rows SET checkboxes = ?2 WHERE id = ?1",
          rusqlite::params![id, encode_checkboxes(&columns)?],
        )?;
        Ok(())
      })
      .await
  }
}
