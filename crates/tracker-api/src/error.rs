//! API error type, the status envelope, and the
//! [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Body of every JSON reply that carries a status: `{"status", "message"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
  pub status:  &'static str,
  pub message: String,
}

impl Envelope {
  pub fn success(message: impl Into<String>) -> Self {
    Self { status: "success", message: message.into() }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self { status: "error", message: message.into() }
  }
}

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  NotFound(String),

  /// The target exists but cannot take the operation as laid out.
  #[error("{0}")]
  Conflict(String),

  /// A pipeline lock could not be acquired in time.
  #[error("Could not acquire lock. Please try again later.")]
  Busy,

  #[error("{0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<tracker_core::Error> for ApiError {
  fn from(e: tracker_core::Error) -> Self {
    use tracker_core::Error as E;
    match e {
      E::LockTimeout { .. } => Self::Busy,
      E::MalformedSubmission(_) | E::InvalidPath { .. } | E::Serialization(_) => {
        Self::BadRequest(e.to_string())
      }
      E::TableNotFound(_) | E::RowOutOfRange { .. } => Self::NotFound(e.to_string()),
      E::MissingColumns { .. } => Self::Conflict(e.to_string()),
      E::Store(inner) => Self::Internal(inner),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Busy => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = match &self {
      ApiError::Busy => self.to_string(),
      other => format!("Error: {other}"),
    };
    if status.is_server_error() {
      tracing::error!(%status, error = %self, "request failed");
    }
    (status, Json(Envelope::error(message))).into_response()
  }
}
