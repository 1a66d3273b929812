//! JSON REST API for contacts.
//!
//! Exposes an axum [`Router`] backed by any [`ContactStore`]. The store decides
//! which principal a request acts for; authentication and TLS are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", contacts_api::api_router(store.clone()))
//! ```

pub mod contacts;
pub mod error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, patch},
};
use contacts_core::store::ContactStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CONTACTS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Principal every request is scoped to.
  pub owner:      String,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 5232 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/contacts/contacts.db") }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ContactStore + 'static,
{
  Router::new()
    .route("/contacts", get(contacts::list::<S>).post(contacts::create::<S>))
    .route(
      "/contacts/{id}",
      patch(contacts::update::<S>).delete(contacts::delete::<S>),
    )
    .with_state(store)
}

/// The whole server: the API under `/api`, with request tracing.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: ContactStore + 'static,
{
  Router::new()
    .nest("/api", api_router(store))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use contacts_core::{
    contact::Contact,
    error::{ErrorBody, StoreErrorKind},
    store::RecordQuery,
  };
  use contacts_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  async fn app() -> (Router, SqliteStore) {
    let store = SqliteStore::open_in_memory("alice").await.unwrap();
    (router(Arc::new(store.clone())), store)
  }

  async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
  }

  fn ann() -> Value {
    json!({ "name": "Ann Lee", "email": "ann@x.com", "phone": "+1 555-0100" })
  }

  // ── Create / list ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_then_list() {
    let (app, _) = app().await;

    let (status, body) = send(&app, "POST", "/api/contacts", Some(ann())).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Contact = serde_json::from_slice(&body).unwrap();
    assert_eq!(created.owner, "alice");

    let (status, body) = send(&app, "GET", "/api/contacts", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<Contact> = serde_json::from_slice(&body).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
  }

  #[tokio::test]
  async fn list_filters_with_query_string() {
    let (app, _) = app().await;
    send(&app, "POST", "/api/contacts", Some(ann())).await;
    let bob = json!({ "name": "Bob Stone", "email": "bob@y.org", "phone": "+1 555-0200" });
    send(&app, "POST", "/api/contacts", Some(bob)).await;

    let (status, body) =
      send(&app, "GET", "/api/contacts?q=BOB&columns=name,email", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows: Vec<Contact> = serde_json::from_slice(&body).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Bob Stone");
  }

  #[tokio::test]
  async fn unknown_order_column_is_bad_request() {
    let (app, _) = app().await;
    let (status, body) =
      send(&app, "GET", "/api/contacts?order=owner", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert_eq!(err.kind, StoreErrorKind::InvalidRequest);
  }

  // ── Validation ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn invalid_record_is_unprocessable() {
    let (app, store) = app().await;
    let bad = json!({ "name": "A", "email": "ann@x.com", "phone": "+1 555-0100" });

    let (status, body) = send(&app, "POST", "/api/contacts", Some(bad)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let err: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert_eq!(err.kind, StoreErrorKind::Constraint);
    assert!(err.error.contains("Name must be at least 2 characters"));

    assert!(store.select(&RecordQuery::all()).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn malformed_json_is_bad_request() {
    let (app, _) = app().await;
    let (status, body) =
      send(&app, "POST", "/api/contacts", Some(json!({ "name": 3 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert_eq!(err.kind, StoreErrorKind::InvalidRequest);
    assert!(!err.error.is_empty());
  }

  // ── Update / delete ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn patch_updates_and_missing_is_404() {
    let (app, _) = app().await;
    let (_, body) = send(&app, "POST", "/api/contacts", Some(ann())).await;
    let created: Contact = serde_json::from_slice(&body).unwrap();

    let changed =
      json!({ "name": "Ann Lee", "email": "ann@x.com", "phone": "+1 555-0199" });
    let uri = format!("/api/contacts/{}", created.id);
    let (status, body) = send(&app, "PATCH", &uri, Some(changed.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let updated: Contact = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated.phone, "+1 555-0199");

    let missing = format!("/api/contacts/{}", uuid::Uuid::new_v4());
    let (status, body) = send(&app, "PATCH", &missing, Some(changed)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let err: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert_eq!(err.kind, StoreErrorKind::NotFound);
  }

  #[tokio::test]
  async fn delete_is_204_then_404() {
    let (app, _) = app().await;
    let (_, body) = send(&app, "POST", "/api/contacts", Some(ann())).await;
    let created: Contact = serde_json::from_slice(&body).unwrap();
    let uri = format!("/api/contacts/{}", created.id);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[test]
  fn config_defaults_fill_missing_keys() {
    let cfg: ServerConfig = serde_json::from_value(json!({ "owner": "alice" })).unwrap();
    assert_eq!(cfg.port, 5232);
    assert_eq!(cfg.host, "127.0.0.1");
  }
}
