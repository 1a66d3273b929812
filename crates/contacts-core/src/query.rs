//! [`QueryClient`]: query/mutation orchestration over [`ContactService`].
//!
//! Reads are cached per [`QueryKey`]; concurrent readers of one key share a
//! single in-flight request. Mutations track their own status, announce their
//! outcome through a [`Notifier`], and invalidate every cached read on
//! success. A read that was started before an invalidation never overwrites
//! the cache, so list state always comes from the latest-started request
//! rather than from response arrival order.

use std::{
  collections::HashMap,
  future::Future,
  sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
  },
};

use futures::{
  FutureExt as _,
  future::{BoxFuture, Shared},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  contact::{Contact, CreateContactInput, UpdateContactInput},
  error::Operation,
  form::FormPayload,
  notify::{Notification, Notifier},
  service::ContactService,
  store::ContactStore,
};

// ─── Keys and status ─────────────────────────────────────────────────────────

/// Stable identifier of a cached read. Every key lives under the "contacts"
/// prefix, so a mutation invalidates all of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
  /// The full list, newest first.
  Contacts,
  /// Server-side search results for a non-empty text.
  Search(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
  #[default]
  Idle,
  Pending,
  Success,
  Error,
}

/// A point-in-time view of one cached read.
#[derive(Debug, Clone, Default)]
pub struct QuerySnapshot {
  pub status: QueryStatus,
  /// The last successful result, kept while a refetch is pending or failed.
  pub data:   Option<Arc<Vec<Contact>>>,
  pub error:  Option<Error>,
  /// Set by invalidation until the next successful read.
  pub stale:  bool,
}

impl QuerySnapshot {
  /// Pending with nothing to show yet.
  pub fn is_loading(&self) -> bool {
    self.status == QueryStatus::Pending && self.data.is_none()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
  Create,
  Update,
  Delete,
}

impl MutationKind {
  pub fn operation(self) -> Operation {
    match self {
      Self::Create => Operation::Create,
      Self::Update => Operation::Update,
      Self::Delete => Operation::Delete,
    }
  }

  pub fn success_message(self) -> &'static str {
    match self {
      Self::Create => "Contact created successfully",
      Self::Update => "Contact updated successfully",
      Self::Delete => "Contact deleted successfully",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationStatus {
  #[default]
  Idle,
  Pending,
  Success,
  /// Carries the message that was shown to the user.
  Error(String),
}

/// Tuning for [`QueryClient`].
#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
  /// Extra attempts a failed read gets before it reports an error.
  pub retry: u32,
}

impl Default for QueryOptions {
  fn default() -> Self { Self { retry: 1 } }
}

// ─── Internal state ──────────────────────────────────────────────────────────

type Fetch = Shared<BoxFuture<'static, Result<Arc<Vec<Contact>>>>>;

#[derive(Default)]
struct QueryEntry {
  snapshot:  QuerySnapshot,
  /// The request currently feeding this entry, tagged with its request id.
  in_flight: Option<(u64, Fetch)>,
}

#[derive(Default)]
struct MutationEntry {
  status:  MutationStatus,
  pending: usize,
}

// ─── Client ──────────────────────────────────────────────────────────────────

pub struct QueryClient<S> {
  service:    Arc<ContactService<S>>,
  notifier:   Arc<dyn Notifier>,
  options:    QueryOptions,
  next_id:    AtomicU64,
  queries:    Mutex<HashMap<QueryKey, QueryEntry>>,
  mutations:  Mutex<HashMap<MutationKind, MutationEntry>>,
}

impl<S> QueryClient<S>
where
  S: ContactStore + 'static,
{
  pub fn new(
    service: Arc<ContactService<S>>,
    notifier: Arc<dyn Notifier>,
    options: QueryOptions,
  ) -> Self {
    Self {
      service,
      notifier,
      options,
      next_id: AtomicU64::new(0),
      queries: Mutex::default(),
      mutations: Mutex::default(),
    }
  }

  pub fn service(&self) -> &ContactService<S> { &self.service }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// The contact list: served from cache when fresh, fetched otherwise.
  pub async fn contacts(&self) -> Result<Arc<Vec<Contact>>> {
    self.read(QueryKey::Contacts).await
  }

  /// Server-side search. Disabled for empty text: returns `None` without
  /// issuing a request.
  pub async fn search(&self, text: &str) -> Result<Option<Arc<Vec<Contact>>>> {
    if text.is_empty() {
      return Ok(None);
    }
    self.read(QueryKey::Search(text.to_owned())).await.map(Some)
  }

  /// Fetch `key` now, joining a request already in flight for it.
  pub async fn refetch(&self, key: QueryKey) -> Result<Arc<Vec<Contact>>> {
    let (id, fetch) = self.begin_fetch(&key);
    let result = fetch.await;
    self.settle_fetch(&key, id, &result);
    result
  }

  pub fn snapshot(&self, key: &QueryKey) -> QuerySnapshot {
    self
      .queries()
      .get(key)
      .map(|entry| entry.snapshot.clone())
      .unwrap_or_default()
  }

  /// Mark the contact list stale, abandon requests in flight, and refetch
  /// the list if anything has read it. Search results are dropped, so the
  /// cache never holds more than the list plus the searches made since the
  /// last mutation; each is fetched again on its next read.
  pub async fn invalidate(&self) {
    let refetch_list = {
      let mut queries = self.queries();
      queries.retain(|key, _| *key == QueryKey::Contacts);
      for entry in queries.values_mut() {
        entry.snapshot.stale = true;
        if entry.in_flight.take().is_some() {
          entry.snapshot.status = if entry.snapshot.data.is_some() {
            QueryStatus::Success
          } else {
            QueryStatus::Idle
          };
        }
      }
      queries.contains_key(&QueryKey::Contacts)
    };
    if refetch_list {
      // Failures are recorded in the snapshot.
      let _ = self.refetch(QueryKey::Contacts).await;
    }
  }

  async fn read(&self, key: QueryKey) -> Result<Arc<Vec<Contact>>> {
    let cached = {
      let queries = self.queries();
      queries.get(&key).and_then(|entry| {
        let snap = &entry.snapshot;
        (snap.status == QueryStatus::Success && !snap.stale)
          .then(|| snap.data.clone())
          .flatten()
      })
    };
    match cached {
      Some(data) => Ok(data),
      None => self.refetch(key).await,
    }
  }

  fn begin_fetch(&self, key: &QueryKey) -> (u64, Fetch) {
    let mut queries = self.queries();
    let entry = queries.entry(key.clone()).or_default();
    if let Some((id, fetch)) = &entry.in_flight {
      debug!(?key, "joining in-flight request");
      return (*id, fetch.clone());
    }
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    let fetch = self.request(key.clone());
    entry.in_flight = Some((id, fetch.clone()));
    entry.snapshot.status = QueryStatus::Pending;
    (id, fetch)
  }

  fn request(&self, key: QueryKey) -> Fetch {
    let service = Arc::clone(&self.service);
    let retry = self.options.retry;
    async move {
      let mut attempt = 0;
      loop {
        let result = match &key {
          QueryKey::Contacts => service.list_all().await,
          QueryKey::Search(text) => service.search(text).await,
        };
        match result {
          Ok(contacts) => return Ok(Arc::new(contacts)),
          Err(err) if attempt < retry => {
            attempt += 1;
            warn!(?key, %err, attempt, "read failed, retrying");
          }
          Err(err) => return Err(err),
        }
      }
    }
    .boxed()
    .shared()
  }

  fn settle_fetch(
    &self,
    key: &QueryKey,
    id: u64,
    result: &Result<Arc<Vec<Contact>>>,
  ) {
    let mut queries = self.queries();
    let Some(entry) = queries.get_mut(key) else { return };
    match &entry.in_flight {
      Some((current, _)) if *current == id => {}
      // Superseded by an invalidation, or already settled by another reader.
      _ => return,
    }
    entry.in_flight = None;
    match result {
      Ok(data) => {
        entry.snapshot.data = Some(Arc::clone(data));
        entry.snapshot.error = None;
        entry.snapshot.stale = false;
        entry.snapshot.status = QueryStatus::Success;
      }
      Err(err) => {
        warn!(?key, %err, "read failed");
        entry.snapshot.error = Some(err.clone());
        entry.snapshot.status = QueryStatus::Error;
      }
    }
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  pub async fn create(&self, input: CreateContactInput) -> Result<Contact> {
    self
      .mutate(MutationKind::Create, self.service.create(input))
      .await
  }

  pub async fn update(&self, input: UpdateContactInput) -> Result<Contact> {
    self
      .mutate(MutationKind::Update, self.service.update(input))
      .await
  }

  pub async fn delete(&self, id: Uuid) -> Result<()> {
    self.mutate(MutationKind::Delete, self.service.delete(id)).await
  }

  /// Start the create or update `payload` asks for. The mutation reads as
  /// pending as soon as this returns, before the future is first polled.
  pub fn save(
    self: &Arc<Self>,
    payload: FormPayload,
  ) -> impl Future<Output = Result<Contact>> + use<S> {
    let kind = match &payload {
      FormPayload::Create(_) => MutationKind::Create,
      FormPayload::Update(_) => MutationKind::Update,
    };
    self.begin_mutation(kind);
    let this = Arc::clone(self);
    async move {
      let result = match payload {
        FormPayload::Create(input) => this.service.create(input).await,
        FormPayload::Update(input) => this.service.update(input).await,
      };
      this.settle_mutation(kind, result).await
    }
  }

  pub fn mutation_status(&self, kind: MutationKind) -> MutationStatus {
    self
      .mutations()
      .get(&kind)
      .map(|entry| entry.status.clone())
      .unwrap_or_default()
  }

  pub fn is_mutating(&self, kind: MutationKind) -> bool {
    self.mutation_status(kind) == MutationStatus::Pending
  }

  /// Return a settled mutation to `Idle`. No effect while one is pending.
  pub fn reset_mutation(&self, kind: MutationKind) {
    let mut mutations = self.mutations();
    if let Some(entry) = mutations.get_mut(&kind)
      && entry.pending == 0
    {
      entry.status = MutationStatus::Idle;
    }
  }

  async fn mutate<T>(
    &self,
    kind: MutationKind,
    request: impl Future<Output = Result<T>>,
  ) -> Result<T> {
    self.begin_mutation(kind);
    let result = request.await;
    self.settle_mutation(kind, result).await
  }

  fn begin_mutation(&self, kind: MutationKind) {
    let mut mutations = self.mutations();
    let entry = mutations.entry(kind).or_default();
    entry.pending += 1;
    entry.status = MutationStatus::Pending;
  }

  async fn settle_mutation<T>(
    &self,
    kind: MutationKind,
    result: Result<T>,
  ) -> Result<T> {
    let outcome = match &result {
      Ok(_) => MutationStatus::Success,
      Err(err) => {
        warn!(operation = %kind.operation(), %err, "mutation failed");
        MutationStatus::Error(err.user_message())
      }
    };
    {
      let mut mutations = self.mutations();
      let entry = mutations.entry(kind).or_default();
      entry.pending = entry.pending.saturating_sub(1);
      entry.status = if entry.pending > 0 {
        MutationStatus::Pending
      } else {
        outcome.clone()
      };
    }

    match outcome {
      MutationStatus::Error(message) => {
        self.notifier.notify(Notification::failure(message));
      }
      _ => {
        self.notifier.notify(Notification::success(kind.success_message()));
        self.invalidate().await;
      }
    }
    result
  }

  fn queries(&self) -> MutexGuard<'_, HashMap<QueryKey, QueryEntry>> {
    self.queries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn mutations(&self) -> MutexGuard<'_, HashMap<MutationKind, MutationEntry>> {
    self.mutations.lock().unwrap_or_else(PoisonError::into_inner)
  }
}
