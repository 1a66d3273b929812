//! Handlers for `/contacts` endpoints.
//!
//! | Method   | Path             | Notes |
//! |----------|------------------|-------|
//! | `GET`    | `/contacts`      | `?order=&ascending=` plus optional `q=` and `columns=` |
//! | `POST`   | `/contacts`      | Body: `{"name":..,"email":..,"phone":..}`; 201 |
//! | `PATCH`  | `/contacts/{id}` | Same body; 404 if not found |
//! | `DELETE` | `/contacts/{id}` | 204; 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use contacts_core::{
  contact::{Contact, CreateContactInput},
  store::{ContactStore, RecordQuery, SelectParams},
};
use uuid::Uuid;

use crate::error::ApiError;

/// Reject a body that is not a contact as a 400. Field rules are the store's
/// to enforce.
fn parsed(
  body: Result<Json<CreateContactInput>, JsonRejection>,
) -> Result<CreateContactInput, ApiError> {
  body
    .map(|Json(input)| input)
    .map_err(|e| ApiError::BadRequest(e.body_text()))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /contacts`
pub async fn list<S: ContactStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<SelectParams>,
) -> Result<Json<Vec<Contact>>, ApiError> {
  let query = RecordQuery::try_from(params)
    .map_err(|e| ApiError::BadRequest(e.message))?;
  let contacts = store.select(&query).await.map_err(ApiError::store)?;
  Ok(Json(contacts))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /contacts`
pub async fn create<S: ContactStore>(
  State(store): State<Arc<S>>,
  body: Result<Json<CreateContactInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let input = parsed(body)?;
  let contact = store.insert(input).await.map_err(ApiError::store)?;
  tracing::info!(id = %contact.id, "contact created");
  Ok((StatusCode::CREATED, Json(contact)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /contacts/{id}`
pub async fn update<S: ContactStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  body: Result<Json<CreateContactInput>, JsonRejection>,
) -> Result<Json<Contact>, ApiError> {
  let changes = parsed(body)?;
  let contact = store.update(id, changes).await.map_err(ApiError::store)?;
  tracing::info!(%id, "contact updated");
  Ok(Json(contact))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /contacts/{id}`
pub async fn delete<S: ContactStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete(id).await.map_err(ApiError::store)?;
  tracing::info!(%id, "contact deleted");
  Ok(StatusCode::NO_CONTENT)
}
