//! Display model
//!
//! Turns a [`ReconciledResult`] into ready-to-render text. Only fields that
//! are present produce output, so the same rendering serves every upstream
//! response shape and the fallback.

use serde::Serialize;

use crate::result::ReconciledResult;
use crate::AnalysisMode;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayModel {
    pub headline: String,
    /// Shown above everything else for fallback results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_banner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_banner: Option<String>,
    pub lines: Vec<String>,
    pub labels: Vec<String>,
    pub tips: Vec<String>,
}

impl DisplayModel {
    pub fn from_result(result: &ReconciledResult) -> Self {
        let headline = match result.mode {
            AnalysisMode::Segregation => "Waste Segregation Result",
            AnalysisMode::Fullness => "Bin Fullness Result",
        }
        .to_string();

        let degraded_banner = result.is_fallback().then(|| {
            "Simulated result: the analysis service could not be reached (mock data)".to_string()
        });

        let alert_banner = (result.alert == Some(true))
            .then(|| "Bin is almost full. Schedule a collection.".to_string());

        let mut lines = Vec::new();
        if let Some(message) = &result.message {
            lines.push(message.clone());
        }
        if let Some(category) = &result.category {
            lines.push(format!("Category: {}", category));
        }
        if let Some(confidence) = result.confidence_pct {
            lines.push(format!("Confidence: {}%", format_pct(confidence)));
        }
        if let Some(fill) = result.fill_pct {
            lines.push(format!("{}% Full", format_pct(fill)));
        }
        if let Some(bin) = &result.recommended_bin {
            lines.push(format!("Recommended bin: {}", bin));
        }
        if let Some(recyclable) = result.recyclable {
            lines.push(if recyclable { "Recyclable" } else { "Not recyclable" }.to_string());
        }
        if let Some(reason) = &result.reason {
            lines.push(format!("Reason: {}", reason));
        }
        if let Some(doc_id) = &result.doc_id {
            lines.push(format!("Record ID: {}", doc_id));
        }

        Self {
            headline,
            degraded_banner,
            alert_banner,
            lines,
            labels: result.labels.clone().unwrap_or_default(),
            tips: result.tips.clone().unwrap_or_default(),
        }
    }

    /// Plain-text rendering for terminals
    pub fn to_text(&self) -> String {
        let mut out = Vec::new();
        if let Some(banner) = &self.degraded_banner {
            out.push(format!("[!] {}", banner));
        }
        out.push(self.headline.clone());
        if let Some(banner) = &self.alert_banner {
            out.push(format!("ALERT: {}", banner));
        }
        out.extend(self.lines.iter().map(|line| format!("  {}", line)));
        if !self.labels.is_empty() {
            out.push(format!("  Labels: {}", self.labels.join(", ")));
        }
        if !self.tips.is_empty() {
            out.push("  Tips:".to_string());
            out.extend(self.tips.iter().map(|tip| format!("    - {}", tip)));
        }
        out.join("\n")
    }
}

/// At most one decimal place, no trailing `.0`
fn format_pct(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}
