//! Application state machine and event dispatcher.
//!
//! Key handling is synchronous: every store request is spawned onto the tokio
//! runtime and reports back through an [`AppEvent`] channel, so the draw loop
//! never waits on the network.

use std::{collections::HashSet, sync::Arc};

use contacts_core::{
  contact::{Contact, Field},
  form::ContactForm,
  query::{MutationKind, QueryClient, QueryKey, QuerySnapshot, QueryStatus},
  store::ContactStore,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::toast::Toasts;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// The contact table has focus.
  List,
  /// The create/edit modal is open.
  Form,
  /// Waiting for the user to confirm a delete.
  ConfirmDelete,
}

/// Outcome of a spawned request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
  /// A list read settled; the new state is in the query cache.
  Loaded,
  /// The save started from form number `form` succeeded.
  Saved { form: u64 },
  SaveFailed { form: u64 },
  /// The delete of this id settled, successfully or not.
  DeleteSettled(Uuid),
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S> {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// Last observed state of the contact list query.
  pub list: QuerySnapshot,

  /// Client-side filter over the loaded list.
  pub filter: String,

  /// Whether the user is typing into the filter.
  pub filter_active: bool,

  /// Cursor position within the *filtered* list.
  pub list_cursor: usize,

  /// The open create/edit form.
  pub form: Option<ContactForm>,

  /// The form field receiving keystrokes.
  pub form_focus: Field,

  /// Bumped each time a form opens so late save results for a closed form are
  /// not applied to a newer one.
  form_seq: u64,

  /// The row awaiting delete confirmation.
  pub pending_delete: Option<Uuid>,

  /// Rows with a delete in flight.
  pub deleting: HashSet<Uuid>,

  pub query:  Arc<QueryClient<S>>,
  pub toasts: Arc<Toasts>,

  events_tx: mpsc::UnboundedSender<AppEvent>,
  events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl<S> App<S>
where
  S: ContactStore + 'static,
{
  pub fn new(query: Arc<QueryClient<S>>, toasts: Arc<Toasts>) -> Self {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    Self {
      screen: Screen::List,
      list: QuerySnapshot::default(),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      form: None,
      form_focus: Field::Name,
      form_seq: 0,
      pending_delete: None,
      deleting: HashSet::new(),
      query,
      toasts,
      events_tx,
      events_rx,
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Start loading the contact list.
  pub fn load(&mut self) {
    let query = Arc::clone(&self.query);
    let tx = self.events_tx.clone();
    tokio::spawn(async move {
      // The outcome lands in the query cache.
      let _ = query.contacts().await;
      let _ = tx.send(AppEvent::Loaded);
    });
    self.refresh();
  }

  /// Re-read the list state from the query cache.
  pub fn refresh(&mut self) {
    self.list = self.query.snapshot(&QueryKey::Contacts);
    let len = self.filtered().len();
    self.list_cursor = self.list_cursor.min(len.saturating_sub(1));
  }

  /// No list data yet and a read is (or is about to be) under way.
  pub fn is_loading(&self) -> bool {
    self.list.is_loading() || self.list.status == QueryStatus::Idle
  }

  /// Every loaded contact, newest first.
  pub fn contacts(&self) -> &[Contact] {
    self.list.data.as_deref().map(Vec::as_slice).unwrap_or_default()
  }

  /// Loaded contacts matching the filter.
  pub fn filtered(&self) -> Vec<&Contact> {
    self
      .contacts()
      .iter()
      .filter(|c| c.matches(&self.filter))
      .collect()
  }

  /// The contact under the list cursor in the filtered view, if any.
  pub fn cursor_contact(&self) -> Option<&Contact> {
    self.filtered().get(self.list_cursor).copied()
  }

  // ── Events ────────────────────────────────────────────────────────────────

  /// Apply every event that has already arrived.
  pub fn drain_events(&mut self) {
    while let Ok(event) = self.events_rx.try_recv() {
      self.apply(event);
    }
  }

  /// Wait for the next event and apply it.
  pub async fn next_event(&mut self) -> Option<AppEvent> {
    let event = self.events_rx.recv().await?;
    self.apply(event.clone());
    Some(event)
  }

  fn apply(&mut self, event: AppEvent) {
    debug!(?event, "app event");
    match event {
      AppEvent::Loaded => {}
      AppEvent::Saved { form } => {
        if form == self.form_seq && self.form.is_some() {
          self.close_form();
        }
      }
      // The form stays open; the notifier reports why.
      AppEvent::SaveFailed { .. } => {}
      AppEvent::DeleteSettled(id) => {
        self.deleting.remove(&id);
      }
    }
    self.refresh();
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
    {
      return false;
    }

    match self.screen {
      Screen::List if self.filter_active => self.handle_filter_key(key),
      Screen::List => return self.handle_list_key(key),
      Screen::Form => self.handle_form_key(key),
      Screen::ConfirmDelete => self.handle_confirm_key(key),
    }
    true
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => return,
    }
    self.list_cursor = 0;
  }

  fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.filtered().len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Char('/') => {
        self.filter_active = true;
        self.list_cursor = 0;
      }
      KeyCode::Esc => {
        self.filter.clear();
        self.list_cursor = 0;
      }

      KeyCode::Char('a') => self.open_form(None),
      KeyCode::Enter | KeyCode::Char('e') => {
        if let Some(contact) = self.cursor_contact().cloned() {
          self.open_form(Some(&contact));
        }
      }
      KeyCode::Char('d') => {
        if let Some(id) = self.cursor_contact().map(|c| c.id)
          && !self.deleting.contains(&id)
        {
          self.pending_delete = Some(id);
          self.screen = Screen::ConfirmDelete;
        }
      }

      _ => {}
    }
    true
  }

  fn handle_form_key(&mut self, key: KeyEvent) {
    let focus = self.form_focus;
    match key.code {
      KeyCode::Esc => self.close_form(),
      KeyCode::Enter => self.submit(),
      KeyCode::Tab | KeyCode::Down => self.form_focus = next_field(focus),
      KeyCode::BackTab | KeyCode::Up => self.form_focus = prev_field(focus),
      KeyCode::Backspace => {
        if let Some(form) = self.form.as_mut() {
          form.pop(focus);
        }
      }
      KeyCode::Char(c) => {
        if let Some(form) = self.form.as_mut() {
          form.push(focus, c);
        }
      }
      _ => {}
    }
  }

  fn handle_confirm_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('y') | KeyCode::Enter => self.confirm_delete(),
      KeyCode::Char('n') | KeyCode::Esc => {
        self.pending_delete = None;
        self.screen = Screen::List;
      }
      _ => {}
    }
  }

  // ── Form ──────────────────────────────────────────────────────────────────

  fn open_form(&mut self, contact: Option<&Contact>) {
    self.form = Some(match contact {
      Some(contact) => ContactForm::edit(contact),
      None => ContactForm::create(),
    });
    self.form_seq += 1;
    self.form_focus = Field::Name;
    self.screen = Screen::Form;
    self.query.reset_mutation(MutationKind::Create);
    self.query.reset_mutation(MutationKind::Update);
  }

  fn close_form(&mut self) {
    self.form = None;
    self.screen = Screen::List;
    self.query.reset_mutation(MutationKind::Create);
    self.query.reset_mutation(MutationKind::Update);
  }

  /// A create or update is in flight.
  pub fn is_saving(&self) -> bool {
    self.query.is_mutating(MutationKind::Create)
      || self.query.is_mutating(MutationKind::Update)
  }

  /// Validate the form and, if it passes, start the save. Ignored while a
  /// save is already in flight.
  fn submit(&mut self) {
    if self.is_saving() {
      return;
    }
    let Some(form) = self.form.as_mut() else { return };
    let Ok(payload) = form.submit() else {
      // Field messages are now on the form.
      return;
    };

    let seq = self.form_seq;
    let save = self.query.save(payload);
    let tx = self.events_tx.clone();
    tokio::spawn(async move {
      let event = if save.await.is_ok() {
        AppEvent::Saved { form: seq }
      } else {
        AppEvent::SaveFailed { form: seq }
      };
      let _ = tx.send(event);
    });
  }

  /// The label on the form's submit button.
  pub fn submit_label(&self) -> &'static str {
    match &self.form {
      Some(_) if self.is_saving() => "Saving...",
      Some(form) if form.is_editing() => "Update Contact",
      _ => "Create Contact",
    }
  }

  // ── Delete ────────────────────────────────────────────────────────────────

  fn confirm_delete(&mut self) {
    self.screen = Screen::List;
    let Some(id) = self.pending_delete.take() else { return };
    if !self.deleting.insert(id) {
      return;
    }

    let query = Arc::clone(&self.query);
    let tx = self.events_tx.clone();
    tokio::spawn(async move {
      // The notifier reports the outcome.
      let _ = query.delete(id).await;
      let _ = tx.send(AppEvent::DeleteSettled(id));
    });
  }
}

fn next_field(field: Field) -> Field {
  match field {
    Field::Name => Field::Email,
    Field::Email => Field::Phone,
    Field::Phone => Field::Name,
  }
}

fn prev_field(field: Field) -> Field {
  match field {
    Field::Name => Field::Phone,
    Field::Email => Field::Name,
    Field::Phone => Field::Email,
  }
}
