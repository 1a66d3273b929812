//! Validation rules for contact input.
//!
//! Pure and synchronous: used by the form before submission and by stores as
//! the authoritative check before a write.

use std::{collections::BTreeMap, fmt};

use email_address::EmailAddress;
use strum::IntoEnumIterator as _;

use crate::contact::{CreateContactInput, Field};

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 255;
pub const PHONE_MIN: usize = 10;
pub const PHONE_MAX: usize = 20;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Field-level violations. At most one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn get(&self, field: Field) -> Option<&str> {
    self.0.get(&field).map(String::as_str)
  }

  pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
    self.0.keys().copied()
  }

  fn insert(&mut self, field: Field, message: &str) {
    self.0.insert(field, message.to_owned());
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for (field, message) in &self.0 {
      if !first {
        f.write_str("; ")?;
      }
      write!(f, "{field}: {message}")?;
      first = false;
    }
    Ok(())
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

pub fn validate_name(name: &str) -> Result<(), &'static str> {
  let len = name.chars().count();
  if len < NAME_MIN {
    return Err("Name must be at least 2 characters");
  }
  if len > NAME_MAX {
    return Err("Name must be less than 100 characters");
  }
  Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
  if email.chars().count() > EMAIL_MAX {
    return Err("Email must be less than 255 characters");
  }
  if !is_email(email) {
    return Err("Invalid email address");
  }
  Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
  let len = phone.chars().count();
  if len < PHONE_MIN {
    return Err("Phone number must be at least 10 digits");
  }
  if len > PHONE_MAX {
    return Err("Phone number must be less than 20 digits");
  }
  if !phone.chars().all(is_phone_char) {
    return Err("Invalid phone number format");
  }
  Ok(())
}

pub fn validate_field(field: Field, value: &str) -> Result<(), &'static str> {
  match field {
    Field::Name => validate_name(value),
    Field::Email => validate_email(value),
    Field::Phone => validate_phone(value),
  }
}

/// Check every field of `input`, collecting all violations.
pub fn validate(input: &CreateContactInput) -> Result<(), ValidationErrors> {
  let mut errors = ValidationErrors::default();
  for field in Field::iter() {
    if let Err(message) = validate_field(field, input.get(field)) {
      errors.insert(field, message);
    }
  }
  if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn is_phone_char(c: char) -> bool {
  c.is_ascii_digit() || matches!(c, ' ' | '-' | '+' | '(' | ')')
}

/// RFC 5322 address syntax, plus a dotted domain ending in an alphabetic TLD.
fn is_email(email: &str) -> bool {
  if !EmailAddress::is_valid(email) {
    return false;
  }
  let Some((_, domain)) = email.rsplit_once('@') else {
    return false;
  };
  match domain.rsplit_once('.') {
    Some((head, tld)) => {
      !head.is_empty()
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
    }
    None => false,
  }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;

  fn valid() -> CreateContactInput {
    CreateContactInput::new("Ann Lee", "ann@example.com", "+1 (555) 010-0100")
  }

  #[test]
  fn valid_input_passes() {
    assert_eq!(validate(&valid()), Ok(()));
  }

  #[test]
  fn all_fields_fail_independently() {
    let input = CreateContactInput::new("A", "nope", "12ab");
    let errors = validate(&input).unwrap_err();
    assert_eq!(errors.get(Field::Name), Some("Name must be at least 2 characters"));
    assert_eq!(errors.get(Field::Email), Some("Invalid email address"));
    assert_eq!(
      errors.get(Field::Phone),
      Some("Phone number must be at least 10 digits")
    );
  }

  #[test]
  fn phone_format_checked_after_length() {
    assert_eq!(
      validate_phone("555.010.0100"),
      Err("Invalid phone number format")
    );
    assert_eq!(
      validate_phone("0123456789012345678901"),
      Err("Phone number must be less than 20 digits")
    );
  }

  #[test]
  fn email_requires_tld() {
    assert!(validate_email("ann@example").is_err());
    assert!(validate_email("ann@example.c0m").is_err());
    assert!(validate_email("ann@@example.com").is_err());
    assert!(validate_email("ann.lee+tag@mail.example.co").is_ok());
  }

  #[test]
  fn overlong_email_rejected() {
    let email = format!("{}@example.com", "a".repeat(250));
    assert_eq!(
      validate_email(&email),
      Err("Email must be less than 255 characters")
    );
  }

  #[test]
  fn name_length_counts_characters() {
    assert!(validate_name("Zoë").is_ok());
    assert!(validate_name("é").is_err());
    assert!(validate_name(&"ü".repeat(100)).is_ok());
  }

  #[test]
  fn display_lists_fields_in_order() {
    let errors = validate(&CreateContactInput::new("A", "ann@x.com", "1")).unwrap_err();
    assert_eq!(
      errors.to_string(),
      "name: Name must be at least 2 characters; \
       phone: Phone number must be at least 10 digits"
    );
  }

  proptest! {
    #[test]
    fn name_outside_bounds_fails_on_name_only(len in prop_oneof![0usize..2, 101usize..160]) {
      let mut input = valid();
      input.name = "n".repeat(len);
      let errors = validate(&input).unwrap_err();
      prop_assert!(errors.get(Field::Name).is_some());
      prop_assert_eq!(errors.fields().count(), 1);
    }

    #[test]
    fn name_inside_bounds_passes(name in "[a-zA-Z ]{2,100}") {
      prop_assert!(validate_name(&name).is_ok());
    }

    #[test]
    fn name_result_independent_of_other_fields(
      name in "[a-z]{0,120}",
      email in "\\PC{0,20}",
      phone in "\\PC{0,25}",
    ) {
      let input = CreateContactInput::new(name.clone(), email, phone);
      let on_name = validate(&input).err().and_then(|e| e.get(Field::Name).map(str::to_owned));
      prop_assert_eq!(on_name.is_some(), validate_name(&name).is_err());
    }

    #[test]
    fn email_without_at_fails(email in "[a-z0-9.]{1,40}") {
      prop_assert!(validate_email(&email).is_err());
    }

    #[test]
    fn well_formed_emails_pass(
      local in "[a-z][a-z0-9]{0,20}",
      domain in "[a-z][a-z0-9]{0,20}",
      tld in "[a-z]{2,6}",
    ) {
      let email = format!("{local}@{domain}.{tld}");
      prop_assert!(validate_email(&email).is_ok(), "{}", email);
    }

    #[test]
    fn phone_with_foreign_char_fails(
      prefix in "[0-9]{5,8}",
      bad in "[a-zA-Z.#*/]",
      suffix in "[0-9]{5,8}",
    ) {
      let phone = format!("{prefix}{bad}{suffix}");
      prop_assert!(validate_phone(&phone).is_err());
    }

    #[test]
    fn phone_of_allowed_chars_passes_within_bounds(phone in "[0-9 +()\\-]{10,20}") {
      prop_assert!(validate_phone(&phone).is_ok());
    }

    #[test]
    fn phone_length_outside_bounds_fails(
      phone in prop_oneof!["[0-9]{0,9}", "[0-9]{21,30}"],
    ) {
      prop_assert!(validate_phone(&phone).is_err());
    }
  }
}
