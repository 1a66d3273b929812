//! [`ContactService`]: the data-access layer.
//!
//! Translates the five logical contact operations into single requests against
//! an injected [`ContactStore`], normalising every backend failure into
//! [`Error`].

use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  contact::{Contact, CreateContactInput, UpdateContactInput},
  error::Operation,
  store::{Column, ContactStore, RecordQuery},
  validate::validate,
};

/// Columns searched by [`ContactService::search`].
pub const SEARCH_COLUMNS: [Column; 3] =
  [Column::Name, Column::Email, Column::Phone];

pub struct ContactService<S> {
  store: S,
}

impl<S: ContactStore> ContactService<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// All of the principal's contacts, newest first.
  pub async fn list_all(&self) -> Result<Vec<Contact>> {
    debug!("listing contacts");
    self
      .store
      .select(&RecordQuery::all())
      .await
      .map_err(|e| Error::from_store(Operation::List, e))
  }

  /// Validate `input` locally, then insert it.
  pub async fn create(&self, input: CreateContactInput) -> Result<Contact> {
    validate(&input).map_err(Error::Validation)?;
    debug!(name = %input.name, "creating contact");
    self
      .store
      .insert(input)
      .await
      .map_err(|e| Error::from_store(Operation::Create, e))
  }

  /// Validate the new fields locally, then overwrite record `input.id`.
  pub async fn update(&self, input: UpdateContactInput) -> Result<Contact> {
    validate(&input.fields).map_err(Error::Validation)?;
    debug!(id = %input.id, "updating contact");
    self
      .store
      .update(input.id, input.fields)
      .await
      .map_err(|e| Error::from_store(Operation::Update, e))
  }

  pub async fn delete(&self, id: Uuid) -> Result<()> {
    debug!(%id, "deleting contact");
    self
      .store
      .delete(id)
      .await
      .map_err(|e| Error::from_store(Operation::Delete, e))
  }

  /// Contacts whose name, email, or phone contains `query`, ignoring case.
  /// Same ordering as [`Self::list_all`].
  pub async fn search(&self, query: &str) -> Result<Vec<Contact>> {
    debug!(query, "searching contacts");
    self
      .store
      .select(&RecordQuery::matching(query, SEARCH_COLUMNS))
      .await
      .map_err(|e| Error::from_store(Operation::Search, e))
  }
}
