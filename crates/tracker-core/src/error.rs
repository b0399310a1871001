//! Error types for `tracker-core`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A structural field needed for routing is absent. Nothing is written.
  #[error("malformed submission: {0}")]
  MalformedSubmission(String),

  #[error("could not acquire {lock} lock within {waited:?}")]
  LockTimeout {
    lock:   &'static str,
    waited: Duration,
  },

  #[error("table {table:?} is missing required columns: {columns:?}")]
  MissingColumns {
    table:   String,
    columns: Vec<String>,
  },

  #[error("invalid path {path:?}: {reason}")]
  InvalidPath { path: String, reason: String },

  #[error("table not found: {0:?}")]
  TableNotFound(String),

  #[error("row {row} out of range for table {table:?}")]
  RowOutOfRange { table: String, row: usize },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Box a backend error into [`Error::Store`].
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn is_lock_timeout(&self) -> bool { matches!(self, Self::LockTimeout { .. }) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
