//! binsight-client - Analyze a waste photo from the terminal
//!
//! Drives the upload/result controller once: select mode, select file,
//! analyze through the relay, print the result. Relay and upstream
//! failures still print a (simulated) result and exit 0; only local input
//! problems exit non-zero.

use anyhow::{Context, Result};
use binsight_client::config::{load_file, ClientArgs, ClientConfig};
use binsight_client::{AnalysisController, HttpRelayClient};
use binsight_common::config::TomlConfig;
use binsight_common::display::DisplayModel;
use binsight_common::AnalysisMode;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = ClientArgs::parse();
    let toml = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load config file")?;
    let config = ClientConfig::resolve(args.relay_url, args.log_level, toml)
        .context("Invalid configuration")?;

    // Logs go to stderr so stdout carries only the result
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("binsight_client={0},binsight_common={0}", config.log_level).into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let mode = AnalysisMode::from(args.mode);
    let file = load_file(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    info!(relay = %config.relay_url, mode = %mode, file = %file.name, "Starting analysis");

    let mut controller = AnalysisController::new();
    controller.select_mode(mode)?;
    controller
        .select_file(file)
        .with_context(|| format!("Cannot analyze {}", args.file.display()))?;

    let relay = HttpRelayClient::new(&config.relay_url).context("Failed to create relay client")?;
    let result = controller
        .trigger_analyze(&relay)
        .await
        .context("Analysis did not start")?;

    println!("{}", DisplayModel::from_result(result).to_text());
    Ok(())
}
