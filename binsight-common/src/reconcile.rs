//! Result-schema reconciliation
//!
//! The classification service's response shape is not versioned and has
//! drifted over time. Three shapes have been observed:
//!
//! - **Rich:** `wasteType`, `confidence`, `recommendedBin`, `tips`, `labels`,
//!   `fullnessLevel`, `docId`
//! - **Flat:** `status`, `message`, `segregated_category`, `detected_labels`,
//!   `confidence`, `fill_percentage`
//! - **Bin level:** `segregated_category`, `bin_level`, `alert`,
//!   `document_id`, `method_used`, `reason`
//!
//! [`reconcile`] maps any of them onto one [`ReconciledResult`] by trying a
//! list of field names per logical attribute, first match wins. Nothing
//! downstream needs to know which shape arrived.

use serde_json::{Map, Value};
use tracing::debug;

use crate::result::{ReconciledResult, ResultSource, ALERT_THRESHOLD_PCT};
use crate::AnalysisMode;

const CATEGORY_FIELDS: &[&str] = &["wasteType", "segregated_category", "category", "waste_type"];
const CONFIDENCE_FIELDS: &[&str] = &["confidence", "confidencePct", "confidence_score"];
const FILL_FIELDS: &[&str] = &["fullnessLevel", "fill_percentage", "bin_level", "fillLevel"];
const ALERT_FIELDS: &[&str] = &["alert", "alert_raised", "is_full"];
const LABEL_FIELDS: &[&str] = &["labels", "detected_labels"];
const TIP_FIELDS: &[&str] = &["tips", "disposal_tips"];
const BIN_FIELDS: &[&str] = &["recommendedBin", "recommended_bin"];
const RECYCLABLE_FIELDS: &[&str] = &["recyclable", "is_recyclable"];
const DOC_ID_FIELDS: &[&str] = &["docId", "document_id", "doc_id"];
const MESSAGE_FIELDS: &[&str] = &["message", "error"];
const REASON_FIELDS: &[&str] = &["reason", "gemini_reasoning"];
const METHOD_FIELDS: &[&str] = &["method_used", "method"];

/// Objects that some producers nest the payload under
const NESTED_CONTAINERS: &[&str] = &["result", "data"];

/// Normalize a raw relay payload into the canonical result record
///
/// `mode` is the mode the user requested; the payload's own
/// `analysisType` echo is not trusted over it. A payload that is not a
/// JSON object yields a record with only `mode`/`status_ok`/`source` set.
pub fn reconcile(mode: AnalysisMode, payload: &Value) -> ReconciledResult {
    let Some(root) = payload.as_object() else {
        debug!(mode = %mode, "Relay payload is not a JSON object, nothing to reconcile");
        return ReconciledResult::empty(mode, ResultSource::Upstream, false);
    };
    let fields = FieldLookup::new(root);

    let mut result = ReconciledResult::empty(mode, ResultSource::Upstream, status_ok(&fields));

    result.message = fields.find_map(MESSAGE_FIELDS, as_text);
    result.category = fields.find_map(CATEGORY_FIELDS, as_text);
    result.confidence_pct = fields.find_map(CONFIDENCE_FIELDS, as_number).and_then(confidence_to_pct);
    result.fill_pct = fields.find_map(FILL_FIELDS, as_number).and_then(clamp_pct);
    result.labels = fields.find_map(LABEL_FIELDS, as_text_list);
    result.tips = fields.find_map(TIP_FIELDS, as_text_list);
    result.recommended_bin = fields.find_map(BIN_FIELDS, as_text);
    result.recyclable = fields.find_map(RECYCLABLE_FIELDS, Value::as_bool);
    result.doc_id = fields.find_map(DOC_ID_FIELDS, as_text);
    result.reason = fields.find_map(REASON_FIELDS, as_text);
    result.method = fields.find_map(METHOD_FIELDS, as_text);
    result.file_name = fields.find_map(&["fileName"], as_text);
    result.file_size = fields.find_map(&["fileSize"], Value::as_u64);

    let explicit_alert = fields.find_map(ALERT_FIELDS, Value::as_bool);
    result.alert = match result.fill_pct {
        Some(fill) => {
            let derived = fill >= ALERT_THRESHOLD_PCT;
            if explicit_alert.is_some_and(|flag| flag != derived) {
                debug!(fill_pct = fill, "Upstream alert flag disagrees with fill level, using fill level");
            }
            Some(derived)
        }
        None => explicit_alert,
    };

    result
}

/// Ordered field lookup across the top-level object and known nested containers
struct FieldLookup<'a> {
    layers: Vec<&'a Map<String, Value>>,
}

impl<'a> FieldLookup<'a> {
    fn new(root: &'a Map<String, Value>) -> Self {
        let mut layers = vec![root];
        layers.extend(
            NESTED_CONTAINERS
                .iter()
                .filter_map(|key| root.get(*key).and_then(Value::as_object)),
        );
        Self { layers }
    }

    /// First present, convertible value among `names`, top level first
    fn find_map<T>(&self, names: &[&str], convert: impl Fn(&Value) -> Option<T>) -> Option<T> {
        self.layers.iter().find_map(|layer| {
            names
                .iter()
                .filter_map(|name| layer.get(*name))
                .find_map(|value| convert(value))
        })
    }
}

fn status_ok(fields: &FieldLookup<'_>) -> bool {
    if fields.find_map(&["error"], |v| (!v.is_null()).then_some(())).is_some() {
        return false;
    }
    if let Some(success) = fields.find_map(&["success", "statusOk"], Value::as_bool) {
        return success;
    }
    match fields.find_map(&["status"], |v| v.as_str().map(str::to_ascii_lowercase)) {
        Some(status) => !matches!(status.as_str(), "error" | "failed" | "failure"),
        None => true,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Number or numeric string; a trailing `%` is accepted and dropped
fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Strings are kept as-is; objects contribute their `description`/`name`/`label`
fn as_text_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(obj) => ["description", "name", "label"]
                        .iter()
                        .find_map(|key| obj.get(*key).and_then(as_text)),
                    other => as_text(other),
                })
                .collect(),
        ),
        Value::String(_) => as_text(value).map(|s| vec![s]),
        _ => None,
    }
}

/// Producers have sent both a 0-1 fraction and a 0-100 percentage under the
/// same name. Values up to 1.0 are read as fractions.
fn confidence_to_pct(raw: f64) -> Option<f64> {
    if raw < 0.0 {
        return None;
    }
    if raw <= 1.0 {
        clamp_pct(raw * 100.0)
    } else {
        clamp_pct(raw)
    }
}

fn clamp_pct(raw: f64) -> Option<f64> {
    if raw < 0.0 {
        return None;
    }
    Some(raw.min(100.0))
}
