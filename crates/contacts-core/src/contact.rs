//! Contact: the single persisted entity.
//!
//! `id`, `owner`, and both timestamps are assigned by the store. Callers only
//! ever supply the mutable subset ([`CreateContactInput`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Fields ──────────────────────────────────────────────────────────────────

/// The caller-editable fields of a contact.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Field {
  Name,
  Email,
  Phone,
}

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A stored contact as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub id:         Uuid,
  /// The principal that owns the record. Never settable by a client.
  pub owner:      String,
  pub name:       String,
  pub email:      String,
  pub phone:      String,
  pub created_at: DateTime<Utc>,
  /// Refreshed by the store on every mutation.
  pub updated_at: DateTime<Utc>,
}

impl Contact {
  /// The current value of `field`.
  pub fn get(&self, field: Field) -> &str {
    match field {
      Field::Name => &self.name,
      Field::Email => &self.email,
      Field::Phone => &self.phone,
    }
  }

  /// Case-insensitive substring match over name, email, and phone.
  ///
  /// An empty needle matches everything.
  pub fn matches(&self, needle: &str) -> bool {
    if needle.is_empty() {
      return true;
    }
    let needle = needle.to_lowercase();
    [&self.name, &self.email, &self.phone]
      .into_iter()
      .any(|value| value.to_lowercase().contains(&needle))
  }

  /// The mutable subset of this contact, e.g. to prefill an edit form.
  pub fn to_input(&self) -> CreateContactInput {
    CreateContactInput {
      name:  self.name.clone(),
      email: self.email.clone(),
      phone: self.phone.clone(),
    }
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::service::ContactService::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateContactInput {
  pub name:  String,
  pub email: String,
  pub phone: String,
}

impl CreateContactInput {
  pub fn new(
    name: impl Into<String>,
    email: impl Into<String>,
    phone: impl Into<String>,
  ) -> Self {
    Self { name: name.into(), email: email.into(), phone: phone.into() }
  }

  pub fn get(&self, field: Field) -> &str {
    match field {
      Field::Name => &self.name,
      Field::Email => &self.email,
      Field::Phone => &self.phone,
    }
  }
}

/// Input to [`crate::service::ContactService::update`]: the full set of
/// mutable fields plus the target record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateContactInput {
  pub id:     Uuid,
  #[serde(flatten)]
  pub fields: CreateContactInput,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn contact(name: &str, email: &str, phone: &str) -> Contact {
    let now = Utc::now();
    Contact {
      id:         Uuid::new_v4(),
      owner:      "tester".into(),
      name:       name.into(),
      email:      email.into(),
      phone:      phone.into(),
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn matches_is_case_insensitive_across_fields() {
    let ann = contact("Ann Lee", "ann@x.com", "+1 555-0100");
    assert!(ann.matches("ann"));
    assert!(ann.matches("LEE"));
    assert!(ann.matches("X.COM"));
    assert!(ann.matches("555-01"));
    assert!(!ann.matches("bob"));
  }

  #[test]
  fn empty_needle_matches_everything() {
    assert!(contact("Bob", "bob@x.com", "0123456789").matches(""));
  }

  #[test]
  fn update_input_serialises_flat() {
    let input = UpdateContactInput {
      id:     Uuid::nil(),
      fields: CreateContactInput::new("Ann Lee", "ann@x.com", "+1 555-0100"),
    };
    let json = serde_json::to_value(&input).unwrap();
    assert_eq!(json["name"], "Ann Lee");
    assert_eq!(json["id"], Uuid::nil().to_string());
  }
}
