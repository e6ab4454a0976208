//! Client command line and configuration

use binsight_common::config::{pick, validate_http_url, TomlConfig, DEFAULT_RELAY_URL};
use binsight_common::{AnalysisMode, Result, SelectedFile};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Command-line arguments for binsight-client
#[derive(Parser, Debug)]
#[command(name = "binsight-client")]
#[command(about = "Analyze a waste photo through a binsight relay")]
#[command(version)]
pub struct ClientArgs {
    /// Kind of analysis to run
    #[arg(short, long, value_enum)]
    pub mode: ModeArg,

    /// Image file to analyze
    #[arg(short, long)]
    pub file: PathBuf,

    /// Base URL of the relay
    #[arg(short, long, env = "BINSIGHT_RELAY_URL")]
    pub relay_url: Option<String>,

    /// Path to config.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "BINSIGHT_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Segregation,
    Fullness,
}

impl From<ModeArg> for AnalysisMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Segregation => AnalysisMode::Segregation,
            ModeArg::Fullness => AnalysisMode::Fullness,
        }
    }
}

/// Resolved client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_url: String,
    pub log_level: String,
}

impl ClientConfig {
    pub fn resolve(relay_url: Option<String>, log_level: Option<String>, toml: TomlConfig) -> Result<Self> {
        let relay_url = pick(relay_url, toml.relay_url, || DEFAULT_RELAY_URL.to_string());
        validate_http_url(&relay_url)?;
        let log_level = pick(log_level, Some(toml.logging.level), || "info".to_string());
        Ok(Self { relay_url, log_level })
    }
}

/// Read a file from disk, detecting its MIME type from the content
///
/// Unrecognized content is reported as `application/octet-stream`, which
/// the controller then rejects as not an image.
pub fn load_file(path: &Path) -> Result<SelectedFile> {
    let bytes = std::fs::read(path)?;
    let mime_type = infer::get(&bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    Ok(SelectedFile::new(name, mime_type, bytes))
}
