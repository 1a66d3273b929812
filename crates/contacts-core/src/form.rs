//! Form binding for the create/edit dialog.
//!
//! Fields are validated on submit; after the first submit each edit
//! re-validates the edited field so messages clear as soon as input is fixed.

use strum::IntoEnumIterator as _;
use uuid::Uuid;

use crate::{
  contact::{Contact, CreateContactInput, Field, UpdateContactInput},
  validate::{ValidationErrors, validate, validate_field},
};

/// One input of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormField {
  value: String,
  error: Option<String>,
}

impl FormField {
  pub fn value(&self) -> &str { &self.value }

  pub fn error(&self) -> Option<&str> { self.error.as_deref() }

  pub fn is_valid(&self) -> bool { self.error.is_none() }
}

/// What a successful submit asks the caller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
  Create(CreateContactInput),
  Update(UpdateContactInput),
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
  /// The contact being edited; `None` for a new one.
  target:    Option<Uuid>,
  name:      FormField,
  email:     FormField,
  phone:     FormField,
  submitted: bool,
}

impl ContactForm {
  /// An empty form for a new contact.
  pub fn create() -> Self { Self::default() }

  /// A form prefilled from `contact`; submitting it yields an update.
  pub fn edit(contact: &Contact) -> Self {
    let mut form = Self { target: Some(contact.id), ..Self::default() };
    for field in Field::iter() {
      form.field_mut(field).value = contact.get(field).to_owned();
    }
    form
  }

  pub fn target(&self) -> Option<Uuid> { self.target }

  pub fn is_editing(&self) -> bool { self.target.is_some() }

  pub fn field(&self, field: Field) -> &FormField {
    match field {
      Field::Name => &self.name,
      Field::Email => &self.email,
      Field::Phone => &self.phone,
    }
  }

  fn field_mut(&mut self, field: Field) -> &mut FormField {
    match field {
      Field::Name => &mut self.name,
      Field::Email => &mut self.email,
      Field::Phone => &mut self.phone,
    }
  }

  pub fn set(&mut self, field: Field, value: impl Into<String>) {
    self.field_mut(field).value = value.into();
    self.revalidate(field);
  }

  pub fn push(&mut self, field: Field, c: char) {
    self.field_mut(field).value.push(c);
    self.revalidate(field);
  }

  pub fn pop(&mut self, field: Field) {
    self.field_mut(field).value.pop();
    self.revalidate(field);
  }

  pub fn is_valid(&self) -> bool {
    Field::iter().all(|f| self.field(f).is_valid())
  }

  pub fn input(&self) -> CreateContactInput {
    CreateContactInput {
      name:  self.name.value.clone(),
      email: self.email.value.clone(),
      phone: self.phone.value.clone(),
    }
  }

  /// Validate every field. On success returns the payload to send; on
  /// failure records each field's message and returns them.
  pub fn submit(&mut self) -> Result<FormPayload, ValidationErrors> {
    self.submitted = true;
    let input = self.input();
    let result = validate(&input);
    for field in Field::iter() {
      let error = result
        .as_ref()
        .err()
        .and_then(|errors| errors.get(field))
        .map(str::to_owned);
      self.field_mut(field).error = error;
    }
    result?;
    Ok(match self.target {
      Some(id) => FormPayload::Update(UpdateContactInput { id, fields: input }),
      None => FormPayload::Create(input),
    })
  }

  fn revalidate(&mut self, field: Field) {
    if !self.submitted {
      return;
    }
    let slot = self.field_mut(field);
    slot.error = validate_field(field, &slot.value).err().map(str::to_owned);
  }
}
