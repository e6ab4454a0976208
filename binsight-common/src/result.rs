//! Canonical analysis result record
//!
//! Every upstream response shape, and every locally generated fallback,
//! ends up as one [`ReconciledResult`]. Apart from `mode`, `status_ok` and
//! `source`, every field is optional and absent fields are omitted on the
//! wire rather than defaulted.

use serde::{Deserialize, Serialize};

use crate::AnalysisMode;

/// Fill percentage at or above which a bin is flagged for collection
pub const ALERT_THRESHOLD_PCT: f64 = 90.0;

/// Where a result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    /// Reconciled from a relay response
    Upstream,
    /// Synthesized locally after a relay failure (mock data)
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledResult {
    pub mode: AnalysisMode,
    pub status_ok: bool,
    pub source: ResultSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_pct: Option<f64>,
    /// 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_bin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recyclable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    /// Upstream's free-text justification for a fill estimate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Upstream estimation method (e.g. `gemini`, `vision_fallback`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

impl ReconciledResult {
    /// Empty record for `mode`; every optional field unset
    pub fn empty(mode: AnalysisMode, source: ResultSource, status_ok: bool) -> Self {
        Self {
            mode,
            status_ok,
            source,
            message: None,
            category: None,
            confidence_pct: None,
            fill_pct: None,
            alert: None,
            labels: None,
            tips: None,
            recommended_bin: None,
            recyclable: None,
            doc_id: None,
            reason: None,
            method: None,
            file_name: None,
            file_size: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ResultSource::Fallback
    }

    /// Set `fill_pct` and derive `alert` from it
    pub fn with_fill(mut self, fill_pct: f64) -> Self {
        self.fill_pct = Some(fill_pct);
        self.alert = Some(fill_pct >= ALERT_THRESHOLD_PCT);
        self
    }
}
