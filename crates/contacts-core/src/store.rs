//! The `ContactStore` trait and supporting query types.
//!
//! The trait is the record-store boundary: a table-oriented CRUD+filter
//! interface implemented by storage backends (`contacts-store-sqlite`) and by
//! remote clients (the HTTP client in `contacts-cli`). Higher layers depend on
//! this abstraction, not on any concrete backend.

use std::{future::Future, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  contact::{Contact, CreateContactInput, Field},
  error::{StoreError, StoreErrorKind},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// A column of the contacts table that can be filtered or ordered on.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Column {
  Name,
  Email,
  Phone,
  CreatedAt,
  UpdatedAt,
}

impl From<Field> for Column {
  fn from(field: Field) -> Self {
    match field {
      Field::Name => Self::Name,
      Field::Email => Self::Email,
      Field::Phone => Self::Phone,
    }
  }
}

impl Column {
  pub fn as_str(self) -> &'static str { self.into() }
}

/// Ordering clause for [`ContactStore::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
  pub column:    Column,
  pub ascending: bool,
}

impl Default for Order {
  /// Newest first.
  fn default() -> Self { Self { column: Column::CreatedAt, ascending: false } }
}

/// Case-insensitive substring filter, OR-ed across `columns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
  pub pattern: String,
  pub columns: Vec<Column>,
}

/// Parameters for [`ContactStore::select`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
  pub filter: Option<Filter>,
  pub order:  Order,
}

impl RecordQuery {
  /// Every record, newest first.
  pub fn all() -> Self { Self::default() }

  /// Records where any of `columns` contains `pattern`, ignoring case.
  pub fn matching(
    pattern: impl Into<String>,
    columns: impl IntoIterator<Item = Column>,
  ) -> Self {
    Self {
      filter: Some(Filter {
        pattern: pattern.into(),
        columns: columns.into_iter().collect(),
      }),
      order:  Order::default(),
    }
  }

  pub fn order_by(mut self, column: Column, ascending: bool) -> Self {
    self.order = Order { column, ascending };
    self
  }
}

// ─── Wire form ───────────────────────────────────────────────────────────────

/// Query-string encoding of a [`RecordQuery`], shared by the HTTP API and its
/// client.
///
/// `?order=created_at&ascending=false[&q=ann&columns=name,email,phone]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectParams {
  pub order:     Option<String>,
  #[serde(default)]
  pub ascending: bool,
  pub q:         Option<String>,
  /// Comma-separated column names; defaults to name, email, and phone.
  pub columns:   Option<String>,
}

impl From<&RecordQuery> for SelectParams {
  fn from(query: &RecordQuery) -> Self {
    Self {
      order:     Some(query.order.column.to_string()),
      ascending: query.order.ascending,
      q:         query.filter.as_ref().map(|f| f.pattern.clone()),
      columns:   query.filter.as_ref().map(|f| {
        f.columns
          .iter()
          .map(|c| c.as_str())
          .collect::<Vec<_>>()
          .join(",")
      }),
    }
  }
}

impl TryFrom<SelectParams> for RecordQuery {
  type Error = StoreError;

  fn try_from(params: SelectParams) -> Result<Self, Self::Error> {
    let column = match params.order.as_deref() {
      Some(name) => parse_column(name)?,
      None => Column::CreatedAt,
    };
    let filter = match params.q {
      Some(pattern) => {
        let columns = match params.columns.as_deref() {
          Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_column)
            .collect::<Result<Vec<_>, _>>()?,
          None => vec![Column::Name, Column::Email, Column::Phone],
        };
        Some(Filter { pattern, columns })
      }
      None => None,
    };
    Ok(Self { filter, order: Order { column, ascending: params.ascending } })
  }
}

fn parse_column(name: &str) -> Result<Column, StoreError> {
  Column::from_str(name).map_err(|_| {
    StoreError::new(
      StoreErrorKind::InvalidRequest,
      format!("unknown column: {name:?}"),
    )
  })
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a contact record store.
///
/// The store is the authority: it assigns `id`, `owner`, and timestamps, scopes
/// every call to its principal, and rejects malformed records even when the
/// caller skipped client-side validation.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + Into<StoreError> + Send + Sync + 'static;

  /// Select the principal's records matching `query`, in the requested order.
  fn select<'a>(
    &'a self,
    query: &'a RecordQuery,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + 'a;

  /// Insert one record and return the stored row.
  fn insert(
    &self,
    input: CreateContactInput,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Overwrite the mutable fields of record `id` and return the stored row.
  /// Fails if no such record is visible to the principal.
  fn update(
    &self,
    id: Uuid,
    changes: CreateContactInput,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Remove record `id`. Fails if it does not exist or is not visible to the
  /// principal; deleting twice fails the second time.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
