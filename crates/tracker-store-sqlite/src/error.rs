//! Error type for `tracker-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("table not found: {0:?}")]
  TableNotFound(String),

  #[error("row {row} out of range for table {table:?}")]
  RowOutOfRange { table: String, row: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
