//! Error types for `contacts-core`.
//!
//! [`Error`] is the typed union returned by every data-access operation.
//! [`StoreError`] is the normalised failure every store backend converts into.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validate::ValidationErrors;

// ─── Operations ──────────────────────────────────────────────────────────────

/// The logical operation a failure belongs to. Selects the fallback message
/// shown when the store gives no usable one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
  List,
  Search,
  Create,
  Update,
  Delete,
}

impl Operation {
  pub fn fallback_message(self) -> &'static str {
    match self {
      Self::List => "Failed to load contacts",
      Self::Search => "Failed to search contacts",
      Self::Create => "Failed to create contact",
      Self::Update => "Failed to update contact",
      Self::Delete => "Failed to delete contact",
    }
  }
}

// ─── Store errors ────────────────────────────────────────────────────────────

/// Classification of a store-reported failure.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StoreErrorKind {
  /// The request never got a response (connection refused, timeout, ...).
  Transport,
  PermissionDenied,
  NotFound,
  /// The store rejected the record as malformed.
  Constraint,
  /// The request itself could not be understood: bad JSON, unknown column.
  InvalidRequest,
  /// Anything else the backend reported.
  Backend,
}

/// A failure reported by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct StoreError {
  pub kind:    StoreErrorKind,
  /// Human-readable message from the store; may be empty.
  pub message: String,
}

impl StoreError {
  pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
    Self { kind, message: message.into() }
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    Self::new(StoreErrorKind::NotFound, message)
  }

  pub fn constraint(message: impl Into<String>) -> Self {
    Self::new(StoreErrorKind::Constraint, message)
  }
}

/// JSON error body shared by the HTTP API and its client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
  pub error: String,
  pub kind:  StoreErrorKind,
}

impl From<ErrorBody> for StoreError {
  fn from(body: ErrorBody) -> Self { Self::new(body.kind, body.error) }
}

// ─── Core error ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error)]
pub enum Error {
  /// Caught before submission; never reaches the store.
  #[error("invalid contact: {0}")]
  Validation(ValidationErrors),

  #[error("{0}")]
  Store(StoreError),

  /// A store failure that carried no recognisable message.
  #[error("{}", operation.fallback_message())]
  Unknown { operation: Operation },
}

impl Error {
  /// Normalise a backend failure for `operation`.
  pub fn from_store(operation: Operation, err: impl Into<StoreError>) -> Self {
    let err = err.into();
    if err.message.trim().is_empty() {
      Self::Unknown { operation }
    } else {
      Self::Store(err)
    }
  }

  /// The text shown to the user: the store's message verbatim when present,
  /// otherwise the fallback for the operation.
  pub fn user_message(&self) -> String {
    match self {
      Self::Validation(errors) => errors.to_string(),
      Self::Store(err) => err.message.clone(),
      Self::Unknown { operation } => operation.fallback_message().to_owned(),
    }
  }

  pub fn store_kind(&self) -> Option<StoreErrorKind> {
    match self {
      Self::Store(err) => Some(err.kind),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_store_message_becomes_unknown() {
    let err = Error::from_store(
      Operation::Create,
      StoreError::new(StoreErrorKind::Backend, "  "),
    );
    assert!(matches!(err, Error::Unknown { operation: Operation::Create }));
    assert_eq!(err.user_message(), "Failed to create contact");
  }

  #[test]
  fn store_message_is_kept_verbatim() {
    let err = Error::from_store(
      Operation::Delete,
      StoreError::not_found("contact not found"),
    );
    assert_eq!(err.user_message(), "contact not found");
    assert_eq!(err.store_kind(), Some(StoreErrorKind::NotFound));
  }

  #[test]
  fn kind_round_trips_through_strings() {
    let kind: StoreErrorKind = "permission_denied".parse().unwrap();
    assert_eq!(kind, StoreErrorKind::PermissionDenied);
    assert_eq!(StoreErrorKind::NotFound.to_string(), "not_found");
  }
}
