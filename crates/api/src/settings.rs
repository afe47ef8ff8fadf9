//! Server settings

use std::path::{Path, PathBuf};

use inference_engine::EngineConfig;
use serde::{Deserialize, Serialize};

/// Config file read from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "deblur.toml";

/// Prefix of environment variable overrides, e.g. `DEBLUR_MODEL_PATH`
pub const ENV_PREFIX: &str = "DEBLUR";

/// Inference service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_addr: String,

    /// Exported generator weights
    pub model_path: PathBuf,

    /// Fail startup instead of serving an unweighted generator
    pub require_weights: bool,

    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,

    /// Return processing error messages to callers verbatim
    pub expose_error_details: bool,

    /// Default log filter when RUST_LOG is unset
    pub log_level: String,

    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            bind_addr: "0.0.0.0:8081".to_string(),
            model_path: engine.model_path,
            require_weights: engine.require_weights,
            max_upload_bytes: 16 * 1024 * 1024,
            expose_error_details: true,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl ServerConfig {
    /// Layer defaults, the config file and `DEBLUR_*` environment variables.
    ///
    /// An explicitly given file must exist; the default file is optional.
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

    /// Model loading settings for the inference engine
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            model_path: self.model_path.clone(),
            require_weights: self.require_weights,
        }
    }
}
