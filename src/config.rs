//! Console configuration
//!
//! Loaded from an optional JSON file:
//!
//! ```json
//! {
//!   "file_path": "file.json",
//!   "prompt": "(hbnb) ",
//!   "log_level": "warn"
//! }
//! ```
//!
//! Every field is optional; absent fields take their defaults.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::console::{CliError, CliResult};
use crate::observability::Severity;

/// Config file looked up when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "./hbnb.json";

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Data file mirrored by the storage engine (default "file.json")
    #[serde(default = "default_file_path")]
    pub file_path: PathBuf,

    /// Prompt shown before each line on an interactive terminal
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Minimum log severity written to stderr (default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_file_path() -> PathBuf {
    PathBuf::from("file.json")
}
fn default_prompt() -> String {
    "(hbnb) ".to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            file_path: default_file_path(),
            prompt: default_prompt(),
            log_level: default_log_level(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: ConsoleConfig = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Resolves the configuration for a run.
    ///
    /// An explicit path must exist. Without one, `DEFAULT_CONFIG_PATH` is
    /// used if present and defaults apply otherwise.
    pub fn resolve(explicit: Option<&Path>) -> CliResult<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                match fs::metadata(path) {
                    Ok(_) => Self::load(path),
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
                    Err(e) => Err(CliError::config_error(format!(
                        "Failed to stat config {}: {}",
                        path.display(),
                        e
                    ))),
                }
            }
        }
    }

    fn validate(&self) -> CliResult<()> {
        if self.file_path.as_os_str().is_empty() {
            return Err(CliError::config_error("file_path must not be empty"));
        }

        if Severity::from_name(&self.log_level).is_none() {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be one of trace, info, warn, error, fatal.",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Configured log severity
    pub fn severity(&self) -> Severity {
        Severity::from_name(&self.log_level).unwrap_or(Severity::Warn)
    }
}
