//! Calls to the analysis relay
//!
//! [`RelayClient`] is the seam between the controller and the network, so
//! the controller can be driven by test doubles. [`HttpRelayClient`] is the
//! real implementation: one multipart POST to `/api/analyze` per call.

use async_trait::async_trait;
use binsight_common::{AnalysisMode, SelectedFile};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use thiserror::Error;

/// Relay call errors
#[derive(Debug, Error)]
pub enum RelayCallError {
    /// Request could not be built (e.g. malformed MIME type)
    #[error("Invalid request: {0}")]
    Request(String),

    /// Connection refused, DNS failure, reset...
    #[error("Relay unreachable: {0}")]
    Transport(String),

    /// Relay answered with a non-2xx status
    #[error("Relay returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Relay answered 2xx with a body that is not JSON
    #[error("Relay response was not JSON: {0}")]
    Decode(String),
}

#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Submit one file for analysis and return the relay's raw JSON body
    async fn analyze(&self, file: &SelectedFile, mode: AnalysisMode) -> Result<Value, RelayCallError>;
}

/// HTTP client for a running binsight-relay
pub struct HttpRelayClient {
    http_client: reqwest::Client,
    analyze_url: String,
}

impl HttpRelayClient {
    pub fn new(relay_url: &str) -> Result<Self, RelayCallError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("binsight-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelayCallError::Request(e.to_string()))?;

        Ok(Self {
            http_client,
            analyze_url: format!("{}/api/analyze", relay_url.trim_end_matches('/')),
        })
    }

    pub fn analyze_url(&self) -> &str {
        &self.analyze_url
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn analyze(&self, file: &SelectedFile, mode: AnalysisMode) -> Result<Value, RelayCallError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| RelayCallError::Request(e.to_string()))?;
        let form = Form::new().part("file", part).text("type", mode.as_str());

        tracing::debug!(url = %self.analyze_url, mode = %mode, file_size = file.size(), "Submitting to relay");

        let response = self
            .http_client
            .post(&self.analyze_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RelayCallError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RelayCallError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        response
            .json()
            .await
            .map_err(|e| RelayCallError::Decode(e.to_string()))
    }
}

/// `error: details` from a relay error body, or the raw text
fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    let error = json.get("error").and_then(Value::as_str);
    let details = json.get("details").and_then(Value::as_str);
    match (error, details) {
        (Some(error), Some(details)) => format!("{}: {}", error, details),
        (Some(error), None) => error.to_string(),
        _ => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_url_joins_cleanly() {
        let client = HttpRelayClient::new("http://127.0.0.1:5780/").unwrap();
        assert_eq!(client.analyze_url(), "http://127.0.0.1:5780/api/analyze");
        let client = HttpRelayClient::new("http://relay.local").unwrap();
        assert_eq!(client.analyze_url(), "http://relay.local/api/analyze");
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"error":"Failed to analyze image","details":"Network error: refused"}"#),
            "Failed to analyze image: Network error: refused"
        );
        assert_eq!(error_message(r#"{"error":"No file uploaded"}"#), "No file uploaded");
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
    }
}
