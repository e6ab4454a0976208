//! Fallback (mock) results
//!
//! When the relay cannot be reached or answers with an error, the
//! controller still shows a result, generated here and flagged with
//! [`ResultSource::Fallback`] and `status_ok = false` so the display layer
//! marks it as simulated.

use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Builder;

use crate::bin_guide::{self, BIN_CHECK};
use crate::result::{ReconciledResult, ResultSource};
use crate::AnalysisMode;

pub const FALLBACK_MESSAGE: &str =
    "Analysis service unavailable. Showing simulated result (mock data).";

/// Generate a fallback result using the thread-local RNG
pub fn generate(mode: AnalysisMode, cause: Option<&str>) -> ReconciledResult {
    generate_with(&mut rand::thread_rng(), mode, cause)
}

/// Generate a fallback result from a caller-supplied RNG
///
/// `cause` is appended to the message so the user can see why the real
/// analysis did not happen.
pub fn generate_with<R: Rng + ?Sized>(
    rng: &mut R,
    mode: AnalysisMode,
    cause: Option<&str>,
) -> ReconciledResult {
    let mut result = ReconciledResult::empty(mode, ResultSource::Fallback, false);

    result.message = Some(match cause {
        Some(cause) => format!("{} ({})", FALLBACK_MESSAGE, cause),
        None => FALLBACK_MESSAGE.to_string(),
    });
    result.doc_id = Some(format!(
        "mock-{}",
        Builder::from_random_bytes(rng.gen()).into_uuid()
    ));
    result.method = Some("mock".to_string());

    match mode {
        AnalysisMode::Segregation => {
            let guides: Vec<_> = bin_guide::material_categories().collect();
            if let Some(guide) = guides.choose(rng) {
                result.category = Some(guide.category.to_string());
                result.recommended_bin = Some(guide.bin.to_string());
                result.recyclable = Some(guide.recyclable);
                result.tips = Some(guide.tips.iter().map(|t| t.to_string()).collect());

                let mut labels: Vec<String> =
                    guide.sample_labels.iter().map(|l| l.to_string()).collect();
                labels.shuffle(rng);
                labels.truncate(rng.gen_range(2..=labels.len().max(2)));
                result.labels = Some(labels);
            }
            // Two decimal places, like the service's rounded scores
            let confidence: f64 = rng.gen_range(70.0..99.0);
            result.confidence_pct = Some((confidence * 100.0).round() / 100.0);
        }
        AnalysisMode::Fullness => {
            result.category = Some(BIN_CHECK.to_string());
            let fill: f64 = rng.gen_range(5.0..=100.0);
            result = result.with_fill((fill * 10.0).round() / 10.0);
        }
    }

    result
}
