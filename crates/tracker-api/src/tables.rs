//! Handlers for `/tables` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tables/{kind}` | Header and rows; 404 if the table does not exist yet |
//! | `POST` | `/tables/{kind}/rows/{row}/resolve` | Optional body `{"comment":"..."}`; returns 204 |
//!
//! `kind` is one of `panel`, `electrical`, `resolved-panel`,
//! `resolved-electrical`, `summary`.
//!
//! A `row` index refers to the table as returned by the last `GET`. It stays
//! valid only until the next archival pass, which removes resolved rows and
//! shifts the rows below them up; re-read the table after a pass.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use bytes::Bytes;
use serde::Deserialize;
use tracker_core::{
  service::Tracker,
  store::{TableKind, TableSnapshot, TableStore},
};

use crate::error::ApiError;

/// `GET /tables/{kind}`
pub async fn get_one<S: TableStore + 'static>(
  State(tracker): State<Tracker<S>>,
  Path(kind): Path<TableKind>,
) -> Result<Json<TableSnapshot>, ApiError> {
  Ok(Json(tracker.read_table(kind).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct ResolveBody {
  pub comment: Option<String>,
}

/// `POST /tables/{kind}/rows/{row}/resolve`
pub async fn resolve<S: TableStore + 'static>(
  State(tracker): State<Tracker<S>>,
  Path((kind, row)): Path<(TableKind, usize)>,
  body: Bytes,
) -> Result<StatusCode, ApiError> {
  let body: ResolveBody = if body.is_empty() {
    ResolveBody::default()
  } else {
    serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
  };

  tracker.resolve_row(kind, row, body.comment).await?;
  Ok(StatusCode::NO_CONTENT)
}
