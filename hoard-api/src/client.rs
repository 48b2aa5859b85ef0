//! HTTP client for the person endpoints.
//!
//! A small typed wrapper over `reqwest` for callers that talk to a running
//! hoard server. Error bodies are decoded back into [`ApiError`], so a caller
//! can tell a missing person from a server-side failure.

use hoard_core::{ContentHash, Person};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::{ApiError, ErrorCode};
use crate::routes::StoreResponse;

/// Base URL of a locally running server's person routes.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/person";

/// Errors returned by [`ApiClient`].
#[derive(Debug, Error)]
pub enum ApiClientError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status.
    #[error("API returned {status}: {error}")]
    Api { status: StatusCode, error: ApiError },

    /// The server answered with a body this client does not understand.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiClientError {
    /// Whether the server reported that nothing is stored under the hash.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiClientError::Api { error, .. } if error.code == ErrorCode::EntityNotFound
        )
    }
}

/// Client for the person endpoints of a hoard server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiClient {
    /// Create a client for the person routes under `base_url`,
    /// e.g. `http://localhost:8000/person`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store a person and return the hash the server assigned.
    pub async fn store_person(&self, person: &Person) -> Result<ContentHash, ApiClientError> {
        let response = self
            .http
            .post(format!("{}/populate/", self.base_url))
            .json(person)
            .send()
            .await?;
        let body: StoreResponse = Self::read_body(response).await?;
        Ok(body.hash)
    }

    /// Retrieve the person stored under `hash`.
    pub async fn retrieve_person(&self, hash: &ContentHash) -> Result<Person, ApiClientError> {
        let response = self
            .http
            .get(format!("{}/retrieve/", self.base_url))
            .query(&[("hash", hash.as_str())])
            .send()
            .await?;
        Self::read_body(response).await
    }

    async fn read_body<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiClientError> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return match serde_json::from_slice::<ApiError>(&bytes) {
                Ok(error) => Err(ApiClientError::Api { status, error }),
                Err(_) => Err(ApiClientError::InvalidResponse(format!(
                    "status {} with body {}",
                    status,
                    String::from_utf8_lossy(&bytes)
                ))),
            };
        }

        serde_json::from_slice(&bytes).map_err(|e| ApiClientError::InvalidResponse(e.to_string()))
    }
}
