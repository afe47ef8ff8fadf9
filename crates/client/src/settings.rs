//! Client settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Config file read from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "invoke.toml";

/// Prefix of environment variable overrides, e.g. `INVOKE_API_URL`
pub const ENV_PREFIX: &str = "INVOKE";

/// Deblur client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Deblur endpoint, local or tunneled
    pub api_url: String,
    /// Verify the server certificate on HTTPS endpoints
    pub verify_tls: bool,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// Also write `<stem>_comparison.png` with the original and the result side by side
    pub compare: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8081/deblur".to_string(),
            verify_tls: true,
            timeout_secs: 60,
            compare: false,
        }
    }
}

impl ClientConfig {
    /// Layer defaults, the config file and `INVOKE_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        config::Config::builder()
            .add_source(config::File::from(file).required(path.is_some()))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
