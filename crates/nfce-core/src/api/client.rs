//! Blocking HTTP client for the backend, plus the async submitter adapter.

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;

use super::types::{DataResponse, ErrorBody, OutcomeResponse, ReceiptRow, Stats, StatsResponse};
use crate::session::ReceiptSubmitter;

/// The backend may take a while per receipt (it runs a crawl per URL), so
/// the request timeout has to outlast the backend's own 30s crawl timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

#[derive(Error, Debug)]
pub enum ApiError {
    /// Network-level failure: connection refused, DNS, timeout.
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a failure (non-2xx or `success: false`).
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// The backend answered 2xx but the body was not the expected JSON.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

/// Typed client for the five backend endpoints.
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /api/process` with the decoded receipt URL.
    ///
    /// Returns the backend's confirmation message.
    pub fn process(&self, url: &str) -> Result<String, ApiError> {
        let response = self
            .agent
            .post(&self.endpoint("/api/process"))
            .send_json(serde_json::json!({ "url": url }))
            .map_err(map_ureq_error)?;

        let outcome: OutcomeResponse = response
            .into_json()
            .map_err(|err| ApiError::InvalidBody(err.to_string()))?;

        if outcome.success {
            Ok(outcome
                .message
                .unwrap_or_else(|| "receipt processed".to_string()))
        } else {
            Err(ApiError::Backend {
                status: 200,
                message: outcome
                    .message
                    .unwrap_or_else(|| "processing failed".to_string()),
            })
        }
    }

    /// `GET /api/stats` — aggregate totals and top stores.
    pub fn stats(&self) -> Result<Stats, ApiError> {
        let response = self
            .agent
            .get(&self.endpoint("/api/stats"))
            .call()
            .map_err(map_ureq_error)?;

        let envelope: StatsResponse = response
            .into_json()
            .map_err(|err| ApiError::InvalidBody(err.to_string()))?;

        match (envelope.success, envelope.stats) {
            (true, Some(stats)) => Ok(stats),
            (_, _) => Err(ApiError::Backend {
                status: 200,
                message: envelope
                    .message
                    .unwrap_or_else(|| "stats unavailable".to_string()),
            }),
        }
    }

    /// `GET /api/data` — all stored receipt rows.
    pub fn data(&self) -> Result<Vec<ReceiptRow>, ApiError> {
        let response = self
            .agent
            .get(&self.endpoint("/api/data"))
            .call()
            .map_err(map_ureq_error)?;

        let envelope: DataResponse = response
            .into_json()
            .map_err(|err| ApiError::InvalidBody(err.to_string()))?;

        if envelope.success {
            Ok(envelope.data)
        } else {
            Err(ApiError::Backend {
                status: 200,
                message: envelope
                    .message
                    .unwrap_or_else(|| "data unavailable".to_string()),
            })
        }
    }

    /// `GET /api/download` — raw CSV bytes.
    pub fn download(&self) -> Result<Vec<u8>, ApiError> {
        let response = self
            .agent
            .get(&self.endpoint("/api/download"))
            .call()
            .map_err(map_ureq_error)?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(bytes)
    }

    /// `POST /api/clear` — destroy all stored receipt data.
    ///
    /// Returns the backend's confirmation message.
    pub fn clear(&self) -> Result<String, ApiError> {
        let response = self
            .agent
            .post(&self.endpoint("/api/clear"))
            .call()
            .map_err(map_ureq_error)?;

        let outcome: OutcomeResponse = response
            .into_json()
            .map_err(|err| ApiError::InvalidBody(err.to_string()))?;

        if outcome.success {
            Ok(outcome.message.unwrap_or_else(|| "data cleared".to_string()))
        } else {
            Err(ApiError::Backend {
                status: 200,
                message: outcome
                    .message
                    .unwrap_or_else(|| "clear failed".to_string()),
            })
        }
    }
}

/// Fold a transport or non-2xx outcome into [`ApiError`], pulling the
/// human-readable message out of `{"error"}` / `{"message"}` bodies.
fn map_ureq_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(status, response) => {
            let message = response
                .into_json::<ErrorBody>()
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            ApiError::Backend { status, message }
        }
        ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
    }
}

/// [`ReceiptSubmitter`] over the blocking [`ApiClient`].
///
/// Bridges into the coordinator's async seam via `spawn_blocking` so the
/// submission never blocks the runtime.
pub struct HttpSubmitter {
    client: Arc<ApiClient>,
}

impl HttpSubmitter {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

impl ReceiptSubmitter for HttpSubmitter {
    fn submit(&self, url: String) -> BoxFuture<'static, Result<String, ApiError>> {
        let client = Arc::clone(&self.client);
        Box::pin(async move {
            tokio::task::spawn_blocking(move || client.process(&url))
                .await
                .map_err(|err| ApiError::Transport(format!("submission task failed: {err}")))?
        })
    }
}
