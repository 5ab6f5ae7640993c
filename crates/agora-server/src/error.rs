//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("conflict: {0}")]
  Conflict(String),
}

impl From<agora_core::Error> for ApiError {
  fn from(e: agora_core::Error) -> Self {
    use agora_core::Error::*;
    let message = e.to_string();
    match e {
      NodeNotFound(_) => Self::NotFound(message),
      EmptyContent | NotReplying => Self::BadRequest(message),
      NotPermitted => Self::Forbidden(message),
      DuplicateNodeId(_)
      | DebateClosed(_)
      | InvalidTransition { .. }
      | AnalysisInFlight => Self::Conflict(message),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
