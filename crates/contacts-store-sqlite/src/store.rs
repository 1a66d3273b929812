//! [`SqliteStore`], the SQLite implementation of [`ContactStore`].

use std::{path::Path, sync::Arc};

use chrono::Utc;
use contacts_core::{
  contact::{Contact, CreateContactInput},
  store::{Column, ContactStore, RecordQuery},
  validate::validate,
};
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{CONTACT_COLUMNS, RawContact, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A contact store backed by a single SQLite file, scoped to one owner.
///
/// Every read and write only sees rows whose `owner` matches the store's.
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  owner:           Arc<str>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, owner: &str) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, owner: owner.into() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory(owner: &str) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, owner: owner.into() };
    store.init_schema().await?;
    Ok(store)
  }

  /// The same database seen by a different owner.
  pub fn with_owner(&self, owner: &str) -> Self {
    Self { conn: self.conn.clone(), owner: owner.into() }
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Build the `SELECT` for `query`. `?1` is the owner and `?2`, when a filter
/// is present, the search pattern.
fn select_sql(query: &RecordQuery) -> String {
  let mut sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE owner = ?1");

  if let Some(filter) = &query.filter {
    let conds: Vec<String> = filter
      .columns
      .iter()
      .filter(|c| matches!(c, Column::Name | Column::Email | Column::Phone))
      .map(|c| format!("instr(lower({}), lower(?2)) > 0", c.as_str()))
      .collect();
    if conds.is_empty() {
      sql.push_str(" AND ?2 IS NULL");
    } else {
      sql.push_str(&format!(" AND ({})", conds.join(" OR ")));
    }
  }

  // `rowid` breaks ties between rows created within the same microsecond.
  let dir = if query.order.ascending { "ASC" } else { "DESC" };
  sql.push_str(&format!(
    " ORDER BY {col} {dir}, rowid {dir}",
    col = query.order.column.as_str()
  ));
  sql
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = Error;

  async fn select(&self, query: &RecordQuery) -> Result<Vec<Contact>> {
    let sql = select_sql(query);
    let mut params = vec![self.owner.to_string()];
    if let Some(filter) = &query.filter {
      params.push(filter.pattern.clone());
    }

    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    debug!(owner = %self.owner, rows = raws.len(), "selected contacts");
    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn insert(&self, input: CreateContactInput) -> Result<Contact> {
    validate(&input).map_err(Error::Validation)?;
    let id_str = encode_uuid(Uuid::new_v4());
    let owner = self.owner.to_string();
    let at_str = encode_dt(Utc::now());

    // The returned row is decoded from what was stored, so timestamps carry
    // the column's precision.
    let raw: RawContact = self
      .conn
      .call(move |conn| {
        let raw = conn.query_row(
          &format!(
            "INSERT INTO contacts (id, owner, name, email, phone, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             RETURNING {CONTACT_COLUMNS}"
          ),
          rusqlite::params![
            id_str,
            owner,
            input.name,
            input.email,
            input.phone,
            at_str
          ],
          RawContact::from_row,
        )?;
        Ok(raw)
      })
      .await?;

    let contact = raw.into_contact()?;
    debug!(id = %contact.id, "inserted contact");
    Ok(contact)
  }

  async fn update(&self, id: Uuid, changes: CreateContactInput) -> Result<Contact> {
    validate(&changes).map_err(Error::Validation)?;
    let id_str = encode_uuid(id);
    let owner = self.owner.to_string();
    let at_str = encode_dt(Utc::now());

    // `max` keeps `updated_at` monotonic even if the clock steps backwards.
    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!(
              "UPDATE contacts
               SET name = ?1, email = ?2, phone = ?3,
                   updated_at = max(?4, updated_at)
               WHERE id = ?5 AND owner = ?6
               RETURNING {CONTACT_COLUMNS}"
            ),
            rusqlite::params![
              changes.name,
              changes.email,
              changes.phone,
              at_str,
              id_str,
              owner
            ],
            RawContact::from_row,
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    let contact = raw.ok_or(Error::NotFound(id))?.into_contact()?;
    debug!(%id, "updated contact");
    Ok(contact)
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let owner = self.owner.to_string();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM contacts WHERE id = ?1 AND owner = ?2",
          rusqlite::params![id_str, owner],
        )?)
      })
      .await?;

    if removed == 0 {
      return Err(Error::NotFound(id));
    }
    debug!(%id, "deleted contact");
    Ok(())
  }
}
