//! Relay configuration
//!
//! **Priority:** command line → environment → TOML → compiled default.
//! clap merges the first two; [`RelayConfig::resolve`] layers the TOML
//! file and defaults underneath.

use binsight_common::config::{
    pick, validate_http_url, TomlConfig, DEFAULT_BIND_ADDR, DEFAULT_MAX_UPLOAD_BYTES,
    DEFAULT_UPSTREAM_URL,
};
use binsight_common::{Error, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for binsight-relay
#[derive(Parser, Debug, Default)]
#[command(name = "binsight-relay")]
#[command(about = "Relays waste photos to the classification service")]
#[command(version)]
pub struct RelayArgs {
    /// Address to listen on
    #[arg(short, long, env = "BINSIGHT_BIND_ADDR")]
    pub bind: Option<String>,

    /// Classification service endpoint
    #[arg(short, long, env = "BINSIGHT_UPSTREAM_URL")]
    pub upstream_url: Option<String>,

    /// Outbound call timeout in seconds (default: no timeout)
    #[arg(long, env = "BINSIGHT_UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: Option<u64>,

    /// Request body limit in bytes
    #[arg(long, env = "BINSIGHT_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,

    /// Path to config.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "BINSIGHT_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Fully resolved relay settings
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: SocketAddr,
    pub upstream_url: String,
    pub upstream_timeout: Option<Duration>,
    pub max_upload_bytes: usize,
    pub log_level: String,
}

impl RelayConfig {
    pub fn resolve(args: RelayArgs, toml: TomlConfig) -> Result<Self> {
        let bind = pick(args.bind, toml.bind_addr, || DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", bind, e)))?;

        let upstream_url = pick(args.upstream_url, toml.upstream_url, || {
            DEFAULT_UPSTREAM_URL.to_string()
        });
        validate_http_url(&upstream_url)?;

        let upstream_timeout = args
            .upstream_timeout_secs
            .or(toml.upstream_timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let max_upload_bytes = pick(args.max_upload_bytes, toml.max_upload_bytes, || {
            DEFAULT_MAX_UPLOAD_BYTES
        });
        if max_upload_bytes == 0 {
            return Err(Error::Config("max_upload_bytes must be greater than zero".to_string()));
        }

        let log_level = pick(args.log_level, Some(toml.logging.level), || "info".to_string());

        Ok(Self {
            bind_addr,
            upstream_url,
            upstream_timeout,
            max_upload_bytes,
            log_level,
        })
    }
}
