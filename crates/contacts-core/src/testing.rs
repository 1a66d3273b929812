//! In-memory test doubles for the store and notification boundaries.

use std::{
  cmp::Ordering,
  sync::{Arc, Mutex, PoisonError},
};

use chrono::Utc;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::{
  contact::{Contact, CreateContactInput},
  error::{StoreError, StoreErrorKind},
  notify::{Notification, Notifier},
  store::{Column, ContactStore, RecordQuery},
  validate::validate,
};

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Inner {
  /// `(insertion sequence, row)`.
  rows:    Vec<(u64, Contact)>,
  seq:     u64,
  calls:   usize,
  selects: usize,
  failure: Option<StoreError>,
  gate:    Option<Arc<Semaphore>>,
}

/// A [`ContactStore`] over a `Vec`, with failure injection and a gate that
/// holds selects until released.
#[derive(Clone)]
pub struct MemoryStore {
  owner: String,
  inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
  pub fn new(owner: &str) -> Self {
    Self { owner: owner.to_owned(), inner: Arc::default() }
  }

  /// Total store calls so far.
  pub fn calls(&self) -> usize { self.lock().calls }

  pub fn selects(&self) -> usize { self.lock().selects }

  /// Fail every call with `kind`/`message` until [`Self::recover`].
  pub fn fail_with(&self, kind: StoreErrorKind, message: &str) {
    self.lock().failure = Some(StoreError::new(kind, message));
  }

  pub fn recover(&self) { self.lock().failure = None; }

  /// Park subsequent selects until [`Self::release`].
  pub fn hold(&self) { self.lock().gate = Some(Arc::new(Semaphore::new(0))); }

  pub fn release(&self) {
    if let Some(gate) = self.lock().gate.take() {
      gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn begin(&self) -> Result<(), StoreError> {
    let mut inner = self.lock();
    inner.calls += 1;
    match &inner.failure {
      Some(err) => Err(err.clone()),
      None => Ok(()),
    }
  }
}

fn compare(a: &Contact, b: &Contact, column: Column) -> Ordering {
  match column {
    Column::Name => a.name.cmp(&b.name),
    Column::Email => a.email.cmp(&b.email),
    Column::Phone => a.phone.cmp(&b.phone),
    Column::CreatedAt => a.created_at.cmp(&b.created_at),
    Column::UpdatedAt => a.updated_at.cmp(&b.updated_at),
  }
}

impl ContactStore for MemoryStore {
  type Error = StoreError;

  async fn select(&self, query: &RecordQuery) -> Result<Vec<Contact>, StoreError> {
    self.lock().selects += 1;
    self.begin()?;

    // The response reflects the rows as they were when the request arrived,
    // even if the gate holds it back.
    let (rows, gate) = {
      let inner = self.lock();
      let mut rows: Vec<_> = inner
        .rows
        .iter()
        .filter(|(_, c)| c.owner == self.owner)
        .filter(|(_, c)| match &query.filter {
          Some(filter) => {
            let needle = filter.pattern.to_lowercase();
            filter.columns.iter().any(|col| {
              let value = match col {
                Column::Name => &c.name,
                Column::Email => &c.email,
                Column::Phone => &c.phone,
                Column::CreatedAt | Column::UpdatedAt => return false,
              };
              value.to_lowercase().contains(&needle)
            })
          }
          None => true,
        })
        .cloned()
        .collect();

      let order = query.order;
      rows.sort_by(|(sa, a), (sb, b)| {
        let ord = compare(a, b, order.column).then(sa.cmp(sb));
        if order.ascending { ord } else { ord.reverse() }
      });
      (rows, inner.gate.clone())
    };

    if let Some(gate) = gate {
      let _permit = gate
        .acquire()
        .await
        .map_err(|e| StoreError::new(StoreErrorKind::Transport, e.to_string()))?;
    }
    Ok(rows.into_iter().map(|(_, c)| c).collect())
  }

  async fn insert(&self, input: CreateContactInput) -> Result<Contact, StoreError> {
    self.begin()?;
    validate(&input).map_err(|e| StoreError::constraint(e.to_string()))?;
    let now = Utc::now();
    let contact = Contact {
      id:         Uuid::new_v4(),
      owner:      self.owner.clone(),
      name:       input.name,
      email:      input.email,
      phone:      input.phone,
      created_at: now,
      updated_at: now,
    };
    let mut inner = self.lock();
    inner.seq += 1;
    let seq = inner.seq;
    inner.rows.push((seq, contact.clone()));
    Ok(contact)
  }

  async fn update(
    &self,
    id: Uuid,
    changes: CreateContactInput,
  ) -> Result<Contact, StoreError> {
    self.begin()?;
    validate(&changes).map_err(|e| StoreError::constraint(e.to_string()))?;
    let mut inner = self.lock();
    let (_, row) = inner
      .rows
      .iter_mut()
      .find(|(_, c)| c.id == id && c.owner == self.owner)
      .ok_or_else(|| StoreError::not_found(format!("contact not found: {id}")))?;
    row.name = changes.name;
    row.email = changes.email;
    row.phone = changes.phone;
    row.updated_at = Utc::now().max(row.updated_at);
    Ok(row.clone())
  }

  async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
    self.begin()?;
    let mut inner = self.lock();
    let before = inner.rows.len();
    let owner = self.owner.clone();
    inner.rows.retain(|(_, c)| !(c.id == id && c.owner == owner));
    if inner.rows.len() == before {
      return Err(StoreError::not_found(format!("contact not found: {id}")));
    }
    Ok(())
  }
}

// ─── Notifier ────────────────────────────────────────────────────────────────

/// Records every notification it receives.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
  seen: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
  pub fn seen(&self) -> Vec<Notification> {
    self.seen.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }
}

impl Notifier for RecordingNotifier {
  fn notify(&self, notification: Notification) {
    self
      .seen
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(notification);
  }
}
