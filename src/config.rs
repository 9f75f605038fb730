// ⚙️ Configuration - JSON file with defaults for every field
//
// `{}` is a complete config: the defaults reproduce the reference service
// (six training phrases, the dashboard's analytics ranges, port 8000).

use crate::analytics::SynthesizerConfig;
use crate::classifier::ClassifierParams;
use crate::error::{PipelineError, PipelineResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Log filter used when RUST_LOG is unset
pub fn default_log_filter() -> &'static str {
    "doc_insight=info,doc_insight_server=info,tower_http=warn"
}

/// Install the fmt subscriber; call once from a binary's main
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .init();
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    #[serde(flatten)]
    pub params: ClassifierParams,

    /// JSON or CSV training set; the built-in reference phrases when absent
    pub training_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted upload body
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    pub synthesizer: SynthesizerConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: AppConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        Ok(config)
    }

    /// `from_file` when a path is given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> PipelineResult<()> {
        self.classifier.params.validate()?;
        self.synthesizer.validate()?;

        if self.server.max_upload_bytes == 0 {
            return Err(PipelineError::Configuration(
                "server max_upload_bytes must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
