//! binsight-client library
//!
//! The upload/result controller and the relay client it drives. The
//! `binsight-client` binary runs one select-mode, select-file, analyze,
//! display cycle from the command line.

pub mod config;
pub mod controller;
pub mod relay_client;

pub use controller::{AnalysisController, AnalyzeTicket, ControllerError, Phase};
pub use relay_client::{HttpRelayClient, RelayCallError, RelayClient};
