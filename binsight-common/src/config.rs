//! Configuration loading
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment handling live in each binary's clap
//! `Args`; this module covers the TOML file and the compiled defaults.
//! A missing config file is never fatal.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "BINSIGHT_CONFIG";

/// Default relay listen address
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5780";

/// Default classification service endpoint (local functions-framework port)
pub const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:8080/";

/// Default relay address used by the client
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:5780";

/// Default request body limit: the 10 MB UI limit plus multipart overhead
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 12 * 1024 * 1024;

/// Contents of `config.toml`
///
/// Every key is optional. The relay and the client read the keys they
/// care about and ignore the rest, so one file can serve both.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Relay listen address, e.g. `0.0.0.0:5780`
    #[serde(default)]
    pub bind_addr: Option<String>,

    /// External classification service endpoint
    #[serde(default)]
    pub upstream_url: Option<String>,

    /// Outbound call timeout. Absent means wait indefinitely.
    #[serde(default)]
    pub upstream_timeout_secs: Option<u64>,

    /// Relay request body limit in bytes
    #[serde(default)]
    pub max_upload_bytes: Option<usize>,

    /// Relay base URL used by the client
    #[serde(default)]
    pub relay_url: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Locate and load the config file, falling back to defaults
    ///
    /// A file that does not exist yields defaults plus a warning when it
    /// was named explicitly. A file that exists but fails to parse is an
    /// error.
    pub fn load_or_default(cli_path: Option<&Path>) -> Result<Self> {
        let explicit = cli_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        let path = match explicit {
            Some(path) if path.exists() => path,
            Some(path) => {
                warn!("Config file {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        info!("Loading config from {}", path.display());
        Self::load(&path)
    }
}

/// `<config_dir>/binsight/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("binsight").join("config.toml"))
}

/// Accept only absolute http(s) URLs with a host
pub fn validate_http_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url).map_err(|e| Error::Config(format!("Invalid URL {}: {}", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!("URL must use http or https: {}", url)));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(Error::Config(format!("URL has no host: {}", url)));
    }
    Ok(())
}

/// First present value among CLI/ENV (already merged by clap), TOML, default
pub fn pick<T>(cli_or_env: Option<T>, toml: Option<T>, default: impl FnOnce() -> T) -> T {
    cli_or_env.or(toml).unwrap_or_else(default)
}
