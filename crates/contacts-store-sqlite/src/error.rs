//! Error type for `contacts-store-sqlite`.

use contacts_core::{
  error::{StoreError, StoreErrorKind},
  validate::ValidationErrors,
};
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The record was rejected before reaching SQL.
  #[error("{0}")]
  Validation(ValidationErrors),

  /// No contact with this id is visible to the store's owner.
  #[error("contact not found: {0}")]
  NotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// True when SQLite rejected a write because of a CHECK, NOT NULL, or
  /// UNIQUE constraint.
  pub fn is_constraint_violation(&self) -> bool {
    matches!(
      self,
      Self::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(e, _)
      )) if e.code == ErrorCode::ConstraintViolation
    )
  }
}

impl From<Error> for StoreError {
  fn from(err: Error) -> Self {
    let kind = match &err {
      Error::NotFound(_) => StoreErrorKind::NotFound,
      Error::Validation(_) => StoreErrorKind::Constraint,
      e if e.is_constraint_violation() => StoreErrorKind::Constraint,
      Error::Database(tokio_rusqlite::Error::ConnectionClosed) => {
        StoreErrorKind::Transport
      }
      _ => StoreErrorKind::Backend,
    };
    StoreError::new(kind, err.to_string())
  }
}
