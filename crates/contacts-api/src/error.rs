//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use contacts_core::error::{ErrorBody, StoreError, StoreErrorKind};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The request itself could not be understood.
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Store(#[from] StoreError),
}

impl ApiError {
  pub fn store(err: impl Into<StoreError>) -> Self { Self::Store(err.into()) }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Store(e) => match e.kind {
        StoreErrorKind::NotFound => StatusCode::NOT_FOUND,
        StoreErrorKind::Constraint => StatusCode::UNPROCESSABLE_ENTITY,
        StoreErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        StoreErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        StoreErrorKind::Transport => StatusCode::BAD_GATEWAY,
        StoreErrorKind::Backend => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match self {
      Self::BadRequest(message) => {
        ErrorBody { error: message, kind: StoreErrorKind::InvalidRequest }
      }
      Self::Store(e) => ErrorBody { error: e.message, kind: e.kind },
    };
    if status.is_server_error() {
      tracing::error!(%status, error = %body.error, "request failed");
    }
    (status, Json(body)).into_response()
  }
}
