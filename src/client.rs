//! Remote Client
//!
//! TigerStyle: Typed HTTP access to the REST transport, one error string out.
//!
//! Every failure (not found, conflict, validation, timeout, refused
//! connection) is collapsed into a `ClientError` carrying a single message:
//! the server-supplied `message` when the response has one, otherwise a
//! fixed fallback for the operation ("Failed to fetch users").

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::api::ErrorBody;
use crate::config::HTTP_TIMEOUT_MS_DEFAULT;
use crate::model::Entity;

// =============================================================================
// Errors
// =============================================================================

/// A normalised client-side failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ClientError {
    pub message: String,
}

impl ClientError {
    /// Create an error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Which call failed; picks the fallback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Fallback message for an entity kind, e.g. `Failed to delete post`.
    pub fn fallback<E: Entity>(self) -> String {
        match self {
            Self::Fetch => format!("Failed to fetch {}", E::COLLECTION),
            Self::Create => format!("Failed to create {}", E::NOUN),
            Self::Update => format!("Failed to update {}", E::NOUN),
            Self::Delete => format!("Failed to delete {}", E::NOUN),
        }
    }
}

// =============================================================================
// Record API Trait
// =============================================================================

/// Remote CRUD over one entity kind.
///
/// The list controller only talks to this trait, so tests can swap in an
/// in-memory fake.
#[async_trait]
pub trait RecordApi<E: Entity>: Send + Sync {
    /// Fetch the full collection.
    async fn fetch_all(&self) -> Result<Vec<E>, ClientError>;

    /// Create a record.
    async fn create(&self, draft: &E::Draft) -> Result<E, ClientError>;

    /// Merge a patch onto a record.
    async fn update(&self, id: u64, patch: &E::Patch) -> Result<E, ClientError>;

    /// Delete a record.
    async fn delete(&self, id: u64) -> Result<(), ClientError>;
}

// =============================================================================
// Remote Client
// =============================================================================

/// reqwest-backed client for the REST transport.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    base_url: String,
    http: reqwest::Client,
}

impl RemoteClient {
    /// Create a client with the default overall timeout.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, Duration::from_millis(HTTP_TIMEOUT_MS_DEFAULT))
    }

    /// Create a client with an explicit overall timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        // Precondition
        assert!(!timeout.is_zero(), "timeout must be positive");

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::new(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url<E: Entity>(&self) -> String {
        format!("{}/{}", self.base_url, E::COLLECTION)
    }

    fn record_url<E: Entity>(&self, id: u64) -> String {
        format!("{}/{}/{}", self.base_url, E::COLLECTION, id)
    }

    /// Fetch the full collection of `E`.
    pub async fn fetch<E: Entity>(&self) -> Result<Vec<E>, ClientError> {
        let url = self.collection_url::<E>();
        tracing::debug!(%url, "GET");
        let response = self.http.get(&url).send().await;
        decode(response, Operation::Fetch.fallback::<E>()).await
    }

    /// POST a new `E`.
    pub async fn create_record<E: Entity>(&self, draft: &E::Draft) -> Result<E, ClientError> {
        let url = self.collection_url::<E>();
        tracing::debug!(%url, "POST");
        let response = self.http.post(&url).json(draft).send().await;
        decode(response, Operation::Create.fallback::<E>()).await
    }

    /// PUT a patch onto an `E`.
    pub async fn update_record<E: Entity>(
        &self,
        id: u64,
        patch: &E::Patch,
    ) -> Result<E, ClientError> {
        let url = self.record_url::<E>(id);
        tracing::debug!(%url, "PUT");
        let response = self.http.put(&url).json(patch).send().await;
        decode(response, Operation::Update.fallback::<E>()).await
    }

    /// DELETE an `E`.
    pub async fn delete_record<E: Entity>(&self, id: u64) -> Result<(), ClientError> {
        let url = self.record_url::<E>(id);
        tracing::debug!(%url, "DELETE");
        let response = self.http.delete(&url).send().await;
        let _: serde_json::Value = decode(response, Operation::Delete.fallback::<E>()).await?;
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> RecordApi<E> for RemoteClient {
    async fn fetch_all(&self) -> Result<Vec<E>, ClientError> {
        self.fetch::<E>().await
    }

    async fn create(&self, draft: &E::Draft) -> Result<E, ClientError> {
        self.create_record::<E>(draft).await
    }

    async fn update(&self, id: u64, patch: &E::Patch) -> Result<E, ClientError> {
        self.update_record::<E>(id, patch).await
    }

    async fn delete(&self, id: u64) -> Result<(), ClientError> {
        self.delete_record::<E>(id).await
    }
}

// =============================================================================
// Response Handling
// =============================================================================

/// Turn a raw response into a typed body or a normalised error.
async fn decode<T: DeserializeOwned>(
    response: reqwest::Result<reqwest::Response>,
    fallback: String,
) -> Result<T, ClientError> {
    let response = match response {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "request failed: {}", fallback);
            return Err(ClientError::new(fallback));
        }
    };

    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(|e| {
            tracing::warn!(error = %e, "undecodable response: {}", fallback);
            ClientError::new(fallback)
        });
    }

    let text = response.text().await.unwrap_or_default();
    let message = server_message(&text).unwrap_or(fallback);
    tracing::warn!(status = status.as_u16(), %message, "request rejected");
    Err(ClientError::new(message))
}

/// Best-effort extraction of the `message` field of an error body.
fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.message)
        .or_else(|| {
            let value: serde_json::Value = serde_json::from_str(body).ok()?;
            value.get("message")?.as_str().map(str::to_string)
        })
        .filter(|m| !m.trim().is_empty())
}

// =============================================================================
// Tests
// =============================================================================
