//! Resolution and archival.
//!
//! A row is resolved when its `Resolved` cell holds `true`. An archival pass
//! moves every resolved row out of the active tables into the archive table
//! chosen by the row's stored job type, then sorts each archive table by
//! `Timestamp`, most recent first.
//!
//! Each source table is processed in two phases. The first collects the rows
//! to migrate; the second applies the moves in descending row order, so a
//! deletion never shifts a row that has yet to be moved.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
  Error, Result,
  config::TrackerConfig,
  schema::SchemaRegistry,
  store::{TableKind, TableStore},
  value::{Cell, Row, SortOrder},
};

// ─── Report ──────────────────────────────────────────────────────────────────

/// What happened to one active table during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
  Archived { moved: usize },
  /// The table has not been created yet.
  Missing,
  /// The table lacks columns archival needs; it was left alone.
  MissingColumns { columns: Vec<String> },
  /// A store call failed part-way; rows moved before the failure stay moved,
  /// and the row in flight stays in its source table.
  Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
  pub kind:   TableKind,
  pub table:  String,
  #[serde(flatten)]
  pub status: SourceStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
  pub sources:     Vec<SourceReport>,
  /// Archive tables that were re-sorted.
  pub sorted:      Vec<String>,
  pub sort_errors: Vec<String>,
}

impl ArchiveReport {
  /// Total rows moved across all sources.
  pub fn moved(&self) -> usize {
    self
      .sources
      .iter()
      .map(|s| match s.status {
        SourceStatus::Archived { moved } => moved,
        _ => 0,
      })
      .sum()
  }
}

// ─── Archival pass ───────────────────────────────────────────────────────────

/// Run one archival pass over the panel table, then the electrical table.
///
/// Failures are contained per table and recorded in the report; a failing
/// source never stops its sibling from being processed.
pub async fn archive_resolved<S: TableStore>(
  store: &S,
  config: &TrackerConfig,
) -> ArchiveReport {
  let mut report = ArchiveReport::default();

  for kind in TableKind::ACTIVE {
    let table = config.table_name(kind).to_owned();
    let status = match archive_source(store, config, &table).await {
      Ok(status) => status,
      Err(e) => {
        tracing::error!(table, error = %e, "archival failed");
        SourceStatus::Failed { error: e.to_string() }
      }
    };
    report.sources.push(SourceReport { kind, table, status });
  }

  for kind in TableKind::ARCHIVE {
    let table = config.table_name(kind);
    match sort_archive(store, config, table).await {
      Ok(true) => report.sorted.push(table.to_owned()),
      Ok(false) => {}
      Err(e) => {
        tracing::error!(table, error = %e, "sorting archive failed");
        report.sort_errors.push(format!("{table}: {e}"));
      }
    }
  }

  tracing::info!(moved = report.moved(), "archival pass complete");
  report
}

async fn archive_source<S: TableStore>(
  store: &S,
  config: &TrackerConfig,
  table: &str,
) -> Result<SourceStatus> {
  let Some(header) = store.read_header(table).await.map_err(Error::store)? else {
    tracing::info!(table, "no such table; nothing to archive");
    return Ok(SourceStatus::Missing);
  };

  let names = &config.columns;
  let position = |name: &str| header.iter().position(|h| h == name);
  let (Some(resolved), Some(job_type), Some(_)) = (
    position(&names.resolved),
    position(&names.job_type),
    position(&names.timestamp),
  ) else {
    let missing: Vec<String> = [&names.resolved, &names.job_type, &names.timestamp]
      .into_iter()
      .filter(|name| position(name).is_none())
      .cloned()
      .collect();
    tracing::warn!(table, ?missing, "required columns not found; skipping");
    return Ok(SourceStatus::MissingColumns { columns: missing });
  };

  let rows = store.read_rows(table).await.map_err(Error::store)?;

  let migrations: Vec<(usize, TableKind, Row)> = rows
    .into_iter()
    .enumerate()
    .filter(|(_, row)| row.get(resolved).is_some_and(Cell::is_true))
    .map(|(index, row)| {
      let job = row.get(job_type).map(Cell::to_string).unwrap_or_default();
      (index, config.archive_for(&job), row)
    })
    .collect();

  let moved = migrations.len();
  let mut destinations: HashMap<TableKind, SchemaRegistry<'_, S>> = HashMap::new();

  for (index, kind, row) in migrations.into_iter().rev() {
    if !destinations.contains_key(&kind) {
      let schema = open_destination(store, config, kind, &header).await?;
      destinations.insert(kind, schema);
    }
    let Some(schema) = destinations.get_mut(&kind) else {
      continue;
    };

    let aligned = align(schema, &header, row).await?;
    store
      .insert_row(schema.table(), 0, aligned)
      .await
      .map_err(Error::store)?;
    if let Err(e) = store.delete_row(table, index).await {
      // Take the copy back out so the row lives in exactly one table.
      if let Err(undo) = store.delete_row(schema.table(), 0).await {
        tracing::error!(
          table = schema.table(),
          error = %undo,
          "could not withdraw archived copy; row is now duplicated"
        );
      }
      return Err(Error::store(e));
    }
    tracing::debug!(from = table, to = schema.table(), row = index, "archived row");
  }

  if moved > 0 {
    tracing::info!(table, moved, "archived resolved rows");
  }
  Ok(SourceStatus::Archived { moved })
}

/// Create the archive table if needed, seeded with the source header, and
/// make sure it carries the reserved columns.
async fn open_destination<'s, S: TableStore>(
  store: &'s S,
  config: &TrackerConfig,
  kind: TableKind,
  source_header: &[String],
) -> Result<SchemaRegistry<'s, S>> {
  let table = config.table_name(kind);
  if store
    .create_table(table, source_header.to_vec())
    .await
    .map_err(Error::store)?
  {
    tracing::info!(table, "created archive table");
  }

  let mut schema = SchemaRegistry::load(store, table).await?;
  for name in config.columns.reserved() {
    schema.ensure_column(&name).await?;
  }
  Ok(schema)
}

/// Re-lay `row` from the source column order into the destination's,
/// matching columns by name. Cell values are copied untouched.
async fn align<S: TableStore>(
  schema: &mut SchemaRegistry<'_, S>,
  source_header: &[String],
  row: Row,
) -> Result<Row> {
  let mut out = vec![Cell::Empty; schema.len()];
  for (name, cell) in source_header.iter().zip(row) {
    if name.is_empty() {
      continue;
    }
    let at = schema.ensure_column(name).await?;
    if out.len() <= at {
      out.resize(at + 1, Cell::Empty);
    }
    out[at] = cell;
  }
  out.resize(schema.len(), Cell::Empty);
  Ok(out)
}

/// Sort an archive table by `Timestamp`, newest first. Returns `false` when
/// there is nothing to sort.
async fn sort_archive<S: TableStore>(
  store: &S,
  config: &TrackerConfig,
  table: &str,
) -> Result<bool> {
  let Some(header) = store.read_header(table).await.map_err(Error::store)? else {
    return Ok(false);
  };
  let Some(timestamp) = header.iter().position(|h| *h == config.columns.timestamp) else {
    tracing::warn!(table, "archive table has no timestamp column; not sorting");
    return Ok(false);
  };
  store
    .sort_rows(table, timestamp, SortOrder::Descending)
    .await
    .map_err(Error::store)?;
  Ok(true)
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// Flag one row of an active table as resolved, optionally recording a
/// comment alongside. Archive and summary tables are not resolvable and read
/// as [`Error::TableNotFound`].
pub async fn resolve_row<S: TableStore>(
  store: &S,
  config: &TrackerConfig,
  kind: TableKind,
  row: usize,
  comment: Option<String>,
) -> Result<()> {
  let table = config.table_name(kind);
  if !kind.is_active() {
    return Err(Error::TableNotFound(table.to_owned()));
  }
  let header = store
    .read_header(table)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::TableNotFound(table.to_owned()))?;

  let names = &config.columns;
  let position = |name: &str| header.iter().position(|h| h == name);
  let missing = |name: &str| Error::MissingColumns {
    table:   table.to_owned(),
    columns: vec![name.to_owned()],
  };

  let resolved = position(&names.resolved).ok_or_else(|| missing(&names.resolved))?;
  let comment_at = match &comment {
    Some(_) => Some(position(&names.comment).ok_or_else(|| missing(&names.comment))?),
    None => None,
  };

  let len = store.read_rows(table).await.map_err(Error::store)?.len();
  if row >= len {
    return Err(Error::RowOutOfRange { table: table.to_owned(), row });
  }

  store
    .write_cell(table, row, resolved, Cell::Bool(true))
    .await
    .map_err(Error::store)?;
  if let (Some(at), Some(text)) = (comment_at, comment) {
    store
      .write_cell(table, row, at, Cell::Text(text))
      .await
      .map_err(Error::store)?;
  }

  tracing::info!(table, row, "resolved row");
  Ok(())
}
