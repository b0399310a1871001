//! Compliance tracker server: configuration, notifiers, the archival
//! scheduler, and the assembled HTTP application.

pub mod config;
pub mod notify;
pub mod scheduler;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracker_core::{service::Tracker, store::TableStore};

pub use config::ServerConfig;

/// The API router with request tracing applied.
pub fn app<S: TableStore + 'static>(tracker: Tracker<S>) -> Router {
  tracker_api::api_router(tracker).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tower::ServiceExt as _;
  use tracker_core::{config::TrackerConfig, memory::MemoryStore};

  use super::*;

  #[tokio::test]
  async fn app_serves_the_api() {
    let tracker = Tracker::new(Arc::new(MemoryStore::new()), TrackerConfig::default());

    let resp = app(tracker)
      .oneshot(
        Request::builder()
          .method("POST")
          .uri("/archive")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
  }
}
