//! Handler for `POST /submissions`, the webhook the audit app calls.

use axum::{Json, extract::State};
use bytes::Bytes;
use tracker_core::{service::Tracker, store::TableStore, submission::Submission};

use crate::error::{ApiError, Envelope};

/// `POST /submissions`
///
/// The body is read raw and parsed here so malformed JSON gets the same
/// error envelope as a malformed submission.
pub async fn create<S: TableStore + 'static>(
  State(tracker): State<Tracker<S>>,
  body: Bytes,
) -> Result<Json<Envelope>, ApiError> {
  let submission = Submission::from_slice(&body)?;
  let outcome = tracker.submit(&submission).await?;

  tracing::info!(
    submission_id = submission.submission_id().as_deref().unwrap_or("-"),
    table = %outcome.ingest.table,
    row = outcome.ingest.row,
    "processed submission"
  );
  Ok(Json(Envelope::success("Data processed successfully")))
}
