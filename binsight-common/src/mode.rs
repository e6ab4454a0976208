//! Analysis modes and uploaded file descriptors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Largest upload the UI accepts (10 MB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Kind of analysis requested from the classification service
///
/// The wire names (`segregation`, `fullness`) are shared by the multipart
/// `type` field, the outbound `analysis_type` field and the result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Classify the material category of a waste item
    Segregation,
    /// Estimate how full a bin is
    Fullness,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 2] = [AnalysisMode::Segregation, AnalysisMode::Fullness];

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisMode::Segregation => "segregation",
            AnalysisMode::Fullness => "fullness",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "segregation" => Ok(AnalysisMode::Segregation),
            "fullness" => Ok(AnalysisMode::Fullness),
            other => Err(Error::InvalidInput(format!(
                "Invalid analysis type: {}. Expected 'segregation' or 'fullness'",
                other
            ))),
        }
    }
}

/// A file picked by the user, held in memory until analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// True for any `image/*` MIME type
    pub fn is_image(&self) -> bool {
        self.mime_type
            .split('/')
            .next()
            .is_some_and(|top| top.trim().eq_ignore_ascii_case("image"))
            && self.mime_type.contains('/')
    }
}
