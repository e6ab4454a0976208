//! # Binsight Common Library
//!
//! Shared code for the binsight relay and client including:
//! - Analysis mode and upload types
//! - The reconciled result record and the reconciliation function
//! - Fallback (mock) result generation
//! - Bin guide (category to bin and disposal tips)
//! - Display model rendering
//! - Configuration loading

pub mod bin_guide;
pub mod config;
pub mod display;
pub mod error;
pub mod fallback;
pub mod mode;
pub mod reconcile;
pub mod result;

pub use error::{Error, Result};
pub use mode::{AnalysisMode, SelectedFile};
pub use reconcile::reconcile;
pub use result::{ReconciledResult, ResultSource, ALERT_THRESHOLD_PCT};
