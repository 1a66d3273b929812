//! Toast notifications: the terminal's [`Notifier`].

use std::{
  sync::{Mutex, PoisonError},
  time::{Duration, Instant},
};

use contacts_core::notify::{Notification, Notifier, Severity};

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(4);

/// Notifications waiting to be drawn, each with the time it arrived.
pub struct Toasts {
  ttl:     Duration,
  entries: Mutex<Vec<(Instant, Notification)>>,
}

impl Default for Toasts {
  fn default() -> Self { Self::new(TOAST_TTL) }
}

impl Toasts {
  pub fn new(ttl: Duration) -> Self { Self { ttl, entries: Mutex::default() } }

  /// Live toasts, oldest first. Expired ones are dropped.
  pub fn visible(&self) -> Vec<Notification> {
    let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    let ttl = self.ttl;
    entries.retain(|(at, _)| at.elapsed() < ttl);
    entries.iter().map(|(_, n)| n.clone()).collect()
  }
}

impl Notifier for Toasts {
  fn notify(&self, notification: Notification) {
    match notification.severity {
      Severity::Success => tracing::info!(message = %notification.message, "toast"),
      Severity::Failure => tracing::warn!(message = %notification.message, "toast"),
    }
    self
      .entries
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push((Instant::now(), notification));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn toasts_expire() {
    let toasts = Toasts::new(Duration::from_millis(30));
    toasts.notify(Notification::success("Contact created successfully"));
    assert_eq!(toasts.visible().len(), 1);

    std::thread::sleep(Duration::from_millis(60));
    assert!(toasts.visible().is_empty());
  }

  #[test]
  fn toasts_keep_arrival_order() {
    let toasts = Toasts::default();
    toasts.notify(Notification::success("first"));
    toasts.notify(Notification::failure("second"));
    let seen: Vec<_> = toasts.visible().into_iter().map(|n| n.message).collect();
    assert_eq!(seen, ["first", "second"]);
  }
}
