//! Handler for `POST /archive`: an on-demand archival pass.

use axum::{Json, extract::State};
use tracker_core::{archive::ArchiveReport, service::Tracker, store::TableStore};

use crate::error::ApiError;

/// `POST /archive`
pub async fn run<S: TableStore + 'static>(
  State(tracker): State<Tracker<S>>,
) -> Result<Json<ArchiveReport>, ApiError> {
  Ok(Json(tracker.run_archival().await?))
}
