//! The notification boundary: fire-and-forget transient messages.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Success,
  Failure,
}

/// A short, user-visible message reporting an operation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub severity: Severity,
  pub message:  String,
}

impl Notification {
  pub fn success(message: impl Into<String>) -> Self {
    Self { severity: Severity::Success, message: message.into() }
  }

  pub fn failure(message: impl Into<String>) -> Self {
    Self { severity: Severity::Failure, message: message.into() }
  }
}

/// Displays transient notifications. Implementations must not block.
pub trait Notifier: Send + Sync {
  fn notify(&self, notification: Notification);
}
