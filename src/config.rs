//! Runtime configuration loaded from `regintel.toml`.
//!
//! Every key is optional. `REGINTEL_OUTPUT_DIR` takes precedence over the
//! file for the output directory; command-line flags are applied on top by
//! the binary.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "regintel.toml";
pub const OUTPUT_DIR_ENV: &str = "REGINTEL_OUTPUT_DIR";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Directory the downloaded report is written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Delay after each pipeline stage, in milliseconds.
    #[serde(default = "default_stage_delay_ms")]
    pub stage_delay_ms: u64,

    /// Log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory holding the rotated log files.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default = "default_file_logging")]
    pub file_logging: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_stage_delay_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_file_logging() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            stage_delay_ms: default_stage_delay_ms(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            file_logging: default_file_logging(),
        }
    }
}

impl AppConfig {
    /// Loads `path`, or `regintel.toml` in the working directory when no path
    /// is given. A missing default file yields the defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        Ok(config.with_output_dir_override(std::env::var(OUTPUT_DIR_ENV).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Replaces `output_dir` with a non-empty override.
    pub fn with_output_dir_override(mut self, value: Option<String>) -> Self {
        if let Some(dir) = value.filter(|v| !v.trim().is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn stage_delay(&self) -> Duration {
        Duration::from_millis(self.stage_delay_ms)
    }
}
