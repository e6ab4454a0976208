//! Reconcile endpoint for the browser page
//!
//! POST /api/reconcile turns whatever the page got back from
//! `/api/analyze` into the canonical result plus display model, so the
//! page never inspects upstream field names itself. When the analyze
//! call failed the page sends `failed: true` and gets a fallback result.

use axum::{extract::rejection::JsonRejection, Json};
use binsight_common::display::DisplayModel;
use binsight_common::{fallback, reconcile, AnalysisMode, ReconciledResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiResult, RelayError};

#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    pub mode: String,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub failed: bool,
    /// Why the analyze call failed, shown in the fallback message
    #[serde(default)]
    pub cause: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub result: ReconciledResult,
    pub display: DisplayModel,
}

/// POST /api/reconcile
pub async fn reconcile_payload(
    request: Result<Json<ReconcileRequest>, JsonRejection>,
) -> ApiResult<Json<ReconcileResponse>> {
    let Json(request) = request.map_err(|e| RelayError::InputValidation(e.body_text()))?;
    let mode: AnalysisMode = request
        .mode
        .parse()
        .map_err(|e: binsight_common::Error| RelayError::InputValidation(e.to_string()))?;

    let result = match request.payload {
        Some(payload) if !request.failed => reconcile(mode, &payload),
        _ => {
            tracing::info!(mode = %mode, cause = ?request.cause, "Generating fallback result");
            fallback::generate(mode, request.cause.as_deref())
        }
    };
    let display = DisplayModel::from_result(&result);

    Ok(Json(ReconcileResponse { result, display }))
}
