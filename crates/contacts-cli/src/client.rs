//! Async HTTP client wrapping the contacts JSON API.
//!
//! [`ApiClient`] is the client-side [`ContactStore`]: every failure, including
//! ones that never got a response, comes back as a [`StoreError`].

use std::time::Duration;

use anyhow::{Context, Result};
use contacts_core::{
  contact::{Contact, CreateContactInput},
  error::{ErrorBody, StoreError, StoreErrorKind},
  store::{ContactStore, RecordQuery, SelectParams},
};
use reqwest::{Client, Response, StatusCode};
use tracing::debug;
use uuid::Uuid;

/// Connection settings for the contacts API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the contacts JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }
}

// ─── Error mapping ───────────────────────────────────────────────────────────

fn transport(err: reqwest::Error) -> StoreError {
  StoreError::new(StoreErrorKind::Transport, err.to_string())
}

/// Kind for an error response whose body could not be read.
fn kind_for_status(status: StatusCode) -> StoreErrorKind {
  match status {
    StatusCode::NOT_FOUND => StoreErrorKind::NotFound,
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
      StoreErrorKind::PermissionDenied
    }
    StatusCode::BAD_REQUEST => StoreErrorKind::InvalidRequest,
    StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
      StoreErrorKind::Constraint
    }
    StatusCode::BAD_GATEWAY
    | StatusCode::SERVICE_UNAVAILABLE
    | StatusCode::GATEWAY_TIMEOUT => StoreErrorKind::Transport,
    _ => StoreErrorKind::Backend,
  }
}

/// Pass a success response through; turn anything else into a
/// [`StoreError`], keeping the server's message when it sent one.
async fn check(resp: Response) -> Result<Response, StoreError> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  debug!(%status, "API returned an error");
  match resp.json::<ErrorBody>().await {
    Ok(body) => Err(body.into()),
    // No usable message: the caller falls back to its per-operation text.
    Err(_) => Err(StoreError::new(kind_for_status(status), "")),
  }
}

async fn decode<T: serde::de::DeserializeOwned>(
  resp: Response,
) -> Result<T, StoreError> {
  resp.json().await.map_err(|e| {
    StoreError::new(StoreErrorKind::Backend, format!("unexpected response: {e}"))
  })
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for ApiClient {
  type Error = StoreError;

  /// `GET /api/contacts?order=..&ascending=..[&q=..&columns=..]`
  async fn select(&self, query: &RecordQuery) -> Result<Vec<Contact>, StoreError> {
    let resp = self
      .client
      .get(self.url("/contacts"))
      .query(&SelectParams::from(query))
      .send()
      .await
      .map_err(transport)?;
    decode(check(resp).await?).await
  }

  /// `POST /api/contacts`
  async fn insert(&self, input: CreateContactInput) -> Result<Contact, StoreError> {
    let resp = self
      .client
      .post(self.url("/contacts"))
      .json(&input)
      .send()
      .await
      .map_err(transport)?;
    decode(check(resp).await?).await
  }

  /// `PATCH /api/contacts/{id}`
  async fn update(
    &self,
    id: Uuid,
    changes: CreateContactInput,
  ) -> Result<Contact, StoreError> {
    let resp = self
      .client
      .patch(self.url(&format!("/contacts/{id}")))
      .json(&changes)
      .send()
      .await
      .map_err(transport)?;
    decode(check(resp).await?).await
  }

  /// `DELETE /api/contacts/{id}`
  async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
    let resp = self
      .client
      .delete(self.url(&format!("/contacts/{id}")))
      .send()
      .await
      .map_err(transport)?;
    check(resp).await?;
    Ok(())
  }
}
