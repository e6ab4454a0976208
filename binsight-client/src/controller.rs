//! Upload/result controller
//!
//! View-state machine for one analysis session:
//!
//! ```text
//!  select_mode / select_file        trigger_analyze            relay answers or fails
//! ───────────────────────────▶ Idle ───────────────▶ Analyzing ─────────────────────▶ ResultReady
//!                               ▲                                                        │
//!                               └──────────── select_file (new pick) / reset ◀───────────┘
//! ```
//!
//! Analysis is split into [`AnalysisController::begin_analyze`] and
//! [`AnalysisController::complete_analyze`] so that at most one request is
//! ever in flight: a second `begin_analyze` while analyzing returns `None`.
//! Every completion, success or failure, produces a result; failures get a
//! fallback record flagged as mock data.

use binsight_common::mode::MAX_UPLOAD_BYTES;
use binsight_common::{fallback, reconcile, AnalysisMode, ReconciledResult, SelectedFile};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::relay_client::{RelayCallError, RelayClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Analyzing,
    ResultReady,
}

/// Rejected user actions. State is left unchanged when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Only image files can be analyzed (got {0})")]
    UnsupportedFileType(String),

    #[error("File is {size} bytes, the limit is {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("A mode has already been selected; reset to choose another")]
    ModeAlreadySelected,

    #[error("An analysis is in progress")]
    AnalysisInFlight,
}

/// Proof that an analysis was started, consumed by `complete_analyze`
#[derive(Debug)]
pub struct AnalyzeTicket {
    epoch: u64,
    pub mode: AnalysisMode,
    pub file: SelectedFile,
}

#[derive(Debug)]
pub struct AnalysisController {
    mode: Option<AnalysisMode>,
    selected_file: Option<SelectedFile>,
    phase: Phase,
    result: Option<ReconciledResult>,
    /// Bumped on reset so a completion from before the reset is dropped
    epoch: u64,
}

impl Default for AnalysisController {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisController {
    pub fn new() -> Self {
        Self {
            mode: None,
            selected_file: None,
            phase: Phase::Idle,
            result: None,
            epoch: 0,
        }
    }

    pub fn mode(&self) -> Option<AnalysisMode> {
        self.mode
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn result(&self) -> Option<&ReconciledResult> {
        self.result.as_ref()
    }

    /// True when `trigger_analyze` would start a request
    pub fn can_analyze(&self) -> bool {
        self.mode.is_some() && self.selected_file.is_some() && self.phase != Phase::Analyzing
    }

    /// Choose the analysis mode. Only allowed while idle with no mode chosen.
    pub fn select_mode(&mut self, mode: AnalysisMode) -> Result<(), ControllerError> {
        match (self.phase, self.mode) {
            (Phase::Analyzing, _) => Err(ControllerError::AnalysisInFlight),
            (Phase::Idle, None) => {
                self.mode = Some(mode);
                self.result = None;
                debug!(mode = %mode, "Mode selected");
                Ok(())
            }
            _ => Err(ControllerError::ModeAlreadySelected),
        }
    }

    /// Pick a file. Must be an image no larger than [`MAX_UPLOAD_BYTES`].
    ///
    /// A new pick after a result is shown discards that result and returns
    /// to idle.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), ControllerError> {
        if self.phase == Phase::Analyzing {
            return Err(ControllerError::AnalysisInFlight);
        }
        if !file.is_image() {
            return Err(ControllerError::UnsupportedFileType(file.mime_type));
        }
        if file.size() > MAX_UPLOAD_BYTES {
            return Err(ControllerError::FileTooLarge {
                size: file.size(),
                limit: MAX_UPLOAD_BYTES,
            });
        }

        debug!(file_name = %file.name, file_size = file.size(), "File selected");
        self.selected_file = Some(file);
        self.result = None;
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Enter `Analyzing` and hand out the request to make
    ///
    /// Returns `None` (and changes nothing) unless a mode and a file are
    /// selected and no analysis is already running.
    pub fn begin_analyze(&mut self) -> Option<AnalyzeTicket> {
        if !self.can_analyze() {
            return None;
        }
        let mode = self.mode?;
        let file = self.selected_file.clone()?;

        self.phase = Phase::Analyzing;
        self.result = None;
        Some(AnalyzeTicket {
            epoch: self.epoch,
            mode,
            file,
        })
    }

    /// Record the relay outcome for a ticket and move to `ResultReady`
    ///
    /// Returns `false` if the ticket is stale (the session was reset while
    /// the request was in flight); the outcome is then discarded.
    pub fn complete_analyze(
        &mut self,
        ticket: AnalyzeTicket,
        outcome: Result<Value, RelayCallError>,
    ) -> bool {
        if ticket.epoch != self.epoch || self.phase != Phase::Analyzing {
            debug!("Discarding analysis outcome for a reset session");
            return false;
        }

        let result = match outcome {
            Ok(payload) => reconcile(ticket.mode, &payload),
            Err(err) => {
                warn!(mode = %ticket.mode, error = %err, "Relay call failed, showing fallback result");
                fallback::generate(ticket.mode, Some(err.to_string().as_str()))
            }
        };
        info!(
            mode = %ticket.mode,
            source = ?result.source,
            status_ok = result.status_ok,
            "Analysis result ready"
        );

        self.result = Some(result);
        self.phase = Phase::ResultReady;
        true
    }

    /// Run one full analysis through `relay`
    ///
    /// No-op returning `None` when [`begin_analyze`](Self::begin_analyze)
    /// refuses. Otherwise always ends in `ResultReady`.
    pub async fn trigger_analyze<R>(&mut self, relay: &R) -> Option<&ReconciledResult>
    where
        R: RelayClient + ?Sized,
    {
        let ticket = self.begin_analyze()?;
        let outcome = relay.analyze(&ticket.file, ticket.mode).await;
        self.complete_analyze(ticket, outcome);
        self.result.as_ref()
    }

    /// Back to the initial state, whatever the current phase
    pub fn reset(&mut self) {
        self.mode = None;
        self.selected_file = None;
        self.phase = Phase::Idle;
        self.result = None;
        self.epoch = self.epoch.wrapping_add(1);
    }
}
