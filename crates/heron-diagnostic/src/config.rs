//! Diagnostics backend configuration

use crate::field::Severity;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Line encoding used by the built-in writer sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Single-line `key=value` format
    Compact,
}

/// Destination for the built-in writer sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stderr,
    Stdout,
    File(PathBuf),
}

/// Configuration for the diagnostics backend.
///
/// Only the factory's backend construction consults this; handlers and the
/// context-binding protocol never read configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticConfig {
    /// Minimum severity written by the sink
    pub level: Severity,

    /// Line encoding
    pub format: LogFormat,

    /// Where lines are written
    pub output: LogOutput,

    /// Attach an RFC 3339 timestamp to each record
    pub include_timestamps: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            level: Severity::Info,
            format: LogFormat::Json,
            output: LogOutput::Stderr,
            include_timestamps: true,
        }
    }
}

impl DiagnosticConfig {
    /// Load configuration from a TOML file, then apply environment
    /// variable overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: DiagnosticConfig = toml::from_str(&content)?;
        config.load_env_overrides();
        Ok(config)
    }

    /// Apply `HERON_LOG_LEVEL`, `HERON_LOG_FORMAT`, and `HERON_LOG_OUTPUT`
    /// overrides. Unrecognized values leave the existing setting in place.
    pub fn load_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("HERON_LOG_LEVEL") {
            if let Ok(level) = level.parse() {
                self.level = level;
            }
        }

        if let Ok(format) = std::env::var("HERON_LOG_FORMAT") {
            match format.to_lowercase().as_str() {
                "json" => self.format = LogFormat::Json,
                "compact" => self.format = LogFormat::Compact,
                _ => {}
            }
        }

        if let Ok(output) = std::env::var("HERON_LOG_OUTPUT") {
            self.output = match output.to_lowercase().as_str() {
                "stderr" => LogOutput::Stderr,
                "stdout" => LogOutput::Stdout,
                _ => LogOutput::File(PathBuf::from(output)),
            };
        }
    }

    /// Validate the configuration, creating the log file's parent
    /// directory when a file destination is configured.
    pub fn validate(&self) -> Result<()> {
        if let LogOutput::File(path) = &self.output {
            if path.as_os_str().is_empty() {
                return Err(Error::Config {
                    message: "log file path is empty".to_string(),
                });
            }

            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = DiagnosticConfig::default();
        assert_eq!(config.level, Severity::Info);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::Stderr);
        assert!(config.include_timestamps);
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = DiagnosticConfig {
            level: Severity::Debug,
            format: LogFormat::Compact,
            output: LogOutput::File(PathBuf::from("/tmp/heron.log")),
            include_timestamps: false,
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: DiagnosticConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: DiagnosticConfig = toml::from_str("level = \"debug\"").unwrap();
        assert_eq!(config.level, Severity::Debug);
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("diagnostic.toml");
        std::fs::write(&path, "level = \"warn\"\nformat = \"compact\"").unwrap();

        let config = DiagnosticConfig::load(&path).unwrap();
        assert_eq!(config.level, Severity::Warn);
        assert_eq!(config.format, LogFormat::Compact);
    }

    #[test]
    fn test_validate_creates_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("heron.log");

        let config = DiagnosticConfig {
            output: LogOutput::File(path.clone()),
            ..DiagnosticConfig::default()
        };

        config.validate().unwrap();
        assert!(path.parent().unwrap().exists());
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("HERON_LOG_LEVEL", "DEBUG");
        std::env::set_var("HERON_LOG_FORMAT", "compact");

        let mut config = DiagnosticConfig::default();
        config.load_env_overrides();

        assert_eq!(config.level, Severity::Debug);
        assert_eq!(config.format, LogFormat::Compact);

        std::env::remove_var("HERON_LOG_LEVEL");
        std::env::remove_var("HERON_LOG_FORMAT");
    }

    #[test]
    fn test_validate_rejects_empty_path() {
        let config = DiagnosticConfig {
            output: LogOutput::File(PathBuf::new()),
            ..DiagnosticConfig::default()
        };

        assert!(config.validate().is_err());
    }
}
