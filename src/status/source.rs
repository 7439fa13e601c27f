// src/status/source.rs
// =============================================================================
// Where status snapshots come from.
//
// The prober is an external service; we only GET its published JSON document.
// StatusSource is the seam between the cache and the network, so the cache
// can be tested without one.
//
// Failure modes, all reported as StatusError:
// - transport errors (DNS, connect, timeout) -> Fetch
// - any non-2xx response                    -> Fetch ("HTTP error! status: 503")
// - body is not {"link_status": [...]}      -> Decode
// =============================================================================

use super::model::StatusSnapshot;
use crate::error::StatusError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self) -> Result<StatusSnapshot, StatusError>;
}

#[derive(Debug, Clone)]
pub struct HttpStatusSource {
    client: Client,
    endpoint: String,
}

impl HttpStatusSource {
    // Builds a source with its own reqwest client
    //
    // Parameters:
    //   endpoint: URL of the prober's result.json
    //   timeout: per-request timeout (connect + body)
    //
    // Returns: Err(StatusError::Fetch) only if the TLS backend fails to initialize
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, StatusError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| StatusError::Fetch(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The URL snapshots are fetched from
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch(&self) -> Result<StatusSnapshot, StatusError> {
        tracing::debug!(endpoint = %self.endpoint, "fetching link status snapshot");

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| StatusError::Fetch(describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatusError::Fetch(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }

        // Read the body first so a bad body is a Decode error, not a Fetch error
        let body = response
            .bytes()
            .await
            .map_err(|e| StatusError::Fetch(describe_transport_error(&e)))?;

        serde_json::from_slice::<StatusSnapshot>(&body).map_err(|e| StatusError::Decode(e.to_string()))
    }
}

// Short, readable message for the UI
fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else if error.is_redirect() {
        "too many redirects".to_string()
    } else {
        error.to_string()
    }
}
