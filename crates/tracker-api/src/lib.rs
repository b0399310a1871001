//! JSON HTTP API for the compliance tracker.
//!
//! Exposes an axum [`Router`] over a [`Tracker`] backed by any
//! [`tracker_core::store::TableStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = tracker_api::api_router(tracker.clone()).layer(TraceLayer::new_for_http());
//! ```

pub mod archive;
pub mod error;
pub mod submissions;
pub mod tables;

use axum::{Router, routing::{get, post}};
use tracker_core::{service::Tracker, store::TableStore};

pub use error::{ApiError, Envelope};

/// Build the API router for `tracker`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(tracker: Tracker<S>) -> Router<()>
where
  S: TableStore + 'static,
{
  Router::new()
    .route("/submissions", post(submissions::create::<S>))
    .route("/archive", post(archive::run::<S>))
    .route("/tables/{kind}", get(tables::get_one::<S>))
    .route("/tables/{kind}/rows/{row}/resolve", post(tables::resolve::<S>))
    .with_state(tracker)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use tracker_core::{config::TrackerConfig, memory::MemoryStore, store::TableKind, value::Cell};

  use super::*;

  fn tracker(lock_timeout_secs: u64) -> Tracker<MemoryStore> {
    let config = TrackerConfig { lock_timeout_secs, ..TrackerConfig::default() };
    Tracker::new(Arc::new(MemoryStore::new()), config)
  }

  fn audit() -> Value {
    json!({
      "metadata": { "submission_id": "97026957", "username": "Mobit" },
      "answers": {
        "Job_Type": { "value": "Installation" },
        "Authorised_for_NC": { "value": "YES" },
        "Compliant": { "value": false },
      },
    })
  }

  async fn send(
    tracker: &Tracker<MemoryStore>,
    method: Method,
    uri: &str,
    body: impl Into<Body>,
  ) -> (StatusCode, Value) {
    let resp = api_router(tracker.clone())
      .oneshot(
        Request::builder()
          .method(method)
          .uri(uri)
          .header("content-type", "application/json")
          .body(body.into())
          .unwrap(),
      )
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
  }

  // ─── Submissions ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn submission_succeeds_with_envelope() {
    let tracker = tracker(1);
    let (status, body) =
      send(&tracker, Method::POST, "/submissions", audit().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "message": "Data processed successfully" }));

    let panel = tracker.read_table(TableKind::Panel).await.unwrap();
    assert_eq!(panel.rows.len(), 1);
  }

  #[tokio::test]
  async fn malformed_json_is_a_bad_request() {
    let tracker = tracker(1);
    let (status, body) = send(&tracker, Method::POST, "/submissions", "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().starts_with("Error: "));
  }

  #[tokio::test]
  async fn submission_without_job_type_is_a_bad_request() {
    let tracker = tracker(1);
    let doc = json!({ "metadata": {}, "answers": {} });
    let (status, body) = send(&tracker, Method::POST, "/submissions", doc.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(tracker.store().table_names().is_empty());
  }

  #[tokio::test]
  async fn lock_timeout_maps_to_service_unavailable() {
    let err = ApiError::from(tracker_core::Error::LockTimeout {
      lock:   "ingestion",
      waited: std::time::Duration::from_secs(30),
    });
    let resp = axum::response::IntoResponse::into_response(err);

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
      body,
      json!({
        "status": "error",
        "message": "Could not acquire lock. Please try again later.",
      })
    );
  }

  // ─── Archive ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn resolve_then_archive_over_http() {
    let tracker = tracker(1);
    send(&tracker, Method::POST, "/submissions", audit().to_string()).await;

    let (status, _) = send(
      &tracker,
      Method::POST,
      "/tables/panel/rows/0/resolve",
      json!({ "comment": "fixed" }).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, report) = send(&tracker, Method::POST, "/archive", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["sources"][0]["status"], "archived");
    assert_eq!(report["sources"][0]["moved"], 1);

    let (status, table) =
      send(&tracker, Method::GET, "/tables/resolved-panel", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(table["rows"].as_array().unwrap().len(), 1);

    let archived = tracker.read_table(TableKind::ResolvedPanel).await.unwrap();
    let comment = archived.position("Comment").unwrap();
    assert_eq!(archived.rows[0][comment], Cell::from("fixed"));
  }

  // ─── Tables ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn absent_table_is_not_found() {
    let tracker = tracker(1);
    let (status, body) = send(&tracker, Method::GET, "/tables/summary", Body::empty()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
  }

  #[tokio::test]
  async fn resolving_a_missing_row_is_not_found() {
    let tracker = tracker(1);
    send(&tracker, Method::POST, "/submissions", audit().to_string()).await;

    let (status, _) =
      send(&tracker, Method::POST, "/tables/panel/rows/9/resolve", Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
