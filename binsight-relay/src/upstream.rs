//! Client for the external image-classification service
//!
//! One request per analysis: the image is base64-encoded and posted as
//! `{"image": ..., "analysis_type": ...}` to a single configured endpoint.
//! There is no retry and no circuit breaking; a failed call is reported to
//! the caller immediately.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use binsight_common::AnalysisMode;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("binsight-relay/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an upstream error body kept for diagnostics
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Upstream call errors
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid upstream response: {0}")]
    Decode(String),

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// Outbound request body
#[derive(Debug, Serialize)]
struct AnalysisRequest<'a> {
    image: String,
    analysis_type: &'a str,
}

/// HTTP client bound to one classification endpoint
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl UpstreamClient {
    /// `timeout` of `None` leaves the call unbounded.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, UpstreamError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Forward one image and return the service's JSON body untouched
    pub async fn analyze(&self, image: &[u8], mode: AnalysisMode) -> Result<Value, UpstreamError> {
        let request = AnalysisRequest {
            image: STANDARD.encode(image),
            analysis_type: mode.as_str(),
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            mode = %mode,
            image_bytes = image.len(),
            "Calling classification service"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        tracing::info!(mode = %mode, status = status.as_u16(), "Classification service responded");

        Ok(body)
    }
}
