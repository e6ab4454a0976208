//! Analysis relay handler
//!
//! POST /api/analyze with multipart fields `file` (binary) and `type`
//! (`segregation` or `fullness`). The image is forwarded to the
//! classification service and its JSON answer is returned with
//! `fileName`, `fileSize` and `analysisType` merged in.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use binsight_common::AnalysisMode;
use serde_json::{json, Map, Value};

use crate::error::{ApiResult, RelayError};
use crate::AppState;

/// An uploaded file as received from the form
#[derive(Debug)]
struct Upload {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Recognized fields of the upload form; anything else is ignored
#[derive(Debug, Default)]
struct AnalysisForm {
    file: Option<Upload>,
    mode: Option<String>,
}

impl AnalysisForm {
    async fn read(multipart: &mut Multipart) -> ApiResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("file") => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    // An empty file input still submits a zero-length part
                    if !bytes.is_empty() {
                        form.file = Some(Upload {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                Some("type") => {
                    form.mode = Some(field.text().await.map_err(multipart_error)?.trim().to_string());
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

fn multipart_error(err: MultipartError) -> RelayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::PayloadTooLarge(format!("Upload too large: {}", err.body_text()))
    } else {
        RelayError::InputValidation(format!("Malformed upload: {}", err.body_text()))
    }
}

/// POST /api/analyze
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Value>> {
    let mut multipart = multipart.map_err(|e| {
        RelayError::InputValidation(format!("Expected a multipart/form-data upload: {}", e.body_text()))
    })?;
    let form = AnalysisForm::read(&mut multipart).await?;

    let upload = form
        .file
        .ok_or_else(|| RelayError::InputValidation("No file uploaded".to_string()))?;
    let mode: AnalysisMode = form
        .mode
        .ok_or_else(|| RelayError::InputValidation("Missing analysis type".to_string()))?
        .parse()
        .map_err(|e: binsight_common::Error| RelayError::InputValidation(e.to_string()))?;

    tracing::info!(
        mode = %mode,
        file_name = %upload.file_name,
        file_size = upload.bytes.len(),
        content_type = upload.content_type.as_deref().unwrap_or("unknown"),
        "Forwarding upload to classification service"
    );

    let body = state
        .upstream
        .analyze(&upload.bytes, mode)
        .await
        .map_err(|e| {
            tracing::warn!(mode = %mode, error = %e, "Classification service call failed");
            RelayError::from(e)
        })?;

    Ok(Json(merge_metadata(body, &upload, mode)))
}

/// Non-object bodies are kept under `result`
fn merge_metadata(body: Value, upload: &Upload, mode: AnalysisMode) -> Value {
    let mut merged = match body {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("result".to_string(), other);
            map
        }
    };
    merged.insert("fileName".to_string(), json!(upload.file_name));
    merged.insert("fileSize".to_string(), json!(upload.bytes.len()));
    merged.insert("analysisType".to_string(), json!(mode.as_str()));
    Value::Object(merged)
}
