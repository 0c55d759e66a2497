//! Configuration schema (configforge.toml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use crate::diagnostic::{DiagnosticCode, Severity};

/// Severity threshold overrides for specific diagnostic codes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityThreshold {
    /// Map of diagnostic code to severity override
    #[serde(default)]
    pub overrides: HashMap<String, Severity>,
}

impl SeverityThreshold {
    /// Get severity for a diagnostic code, or default
    pub fn get_severity(&self, code: DiagnosticCode, default: Severity) -> Severity {
        self.overrides
            .get(code.as_str())
            .copied()
            .unwrap_or(default)
    }

    /// Set severity override for a code
    pub fn set_override(&mut self, code: DiagnosticCode, severity: Severity) {
        self.overrides.insert(code.as_str().to_string(), severity);
    }
}

/// How raw data files are discovered and decoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root directory of the data files
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,

    /// File extension of data files (without dot)
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Encoding label understood by the decoder (e.g. "UTF-8", "GBK")
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Number of header rows; the first is descriptions, the last is names
    #[serde(default = "default_header_rows")]
    pub header_rows: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_extension() -> String {
    "csv".to_string()
}

fn default_encoding() -> String {
    "UTF-8".to_string()
}

fn default_header_rows() -> usize {
    2
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            extension: default_extension(),
            encoding: default_encoding(),
            header_rows: default_header_rows(),
        }
    }
}

/// A consumer view extracted by own tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Own tag to extract
    pub own: String,

    /// Where to write the extracted schema
    pub output: PathBuf,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Raw data settings
    #[serde(default)]
    pub data: DataConfig,

    /// Persisted schema definition file
    #[serde(default = "default_define_file")]
    pub define_file: PathBuf,

    /// Report output file
    #[serde(default = "default_report_file")]
    pub report_file: PathBuf,

    /// Per-consumer views
    #[serde(default)]
    pub views: Vec<ViewConfig>,

    /// Severity thresholds
    #[serde(default)]
    pub severity: SeverityThreshold,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

fn default_define_file() -> PathBuf {
    PathBuf::from("config.json")
}

fn default_report_file() -> PathBuf {
    PathBuf::from("report.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            define_file: default_define_file(),
            report_file: default_report_file(),
            views: Vec::new(),
            severity: SeverityThreshold::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config.data.header_rows == 0 {
            return Err(ConfigError::Invalid(
                "data.header_rows must be at least 1 (the column name row)".to_string(),
            ));
        }
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Resolve a configured path against the project root
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.data.extension, "csv");
        assert_eq!(config.data.header_rows, 2);
        assert!(config.views.is_empty());
    }

    #[test]
    fn severity_override() {
        let mut threshold = SeverityThreshold::default();
        threshold.set_override(DiagnosticCode::SchemaTableDeleted, Severity::Warn);

        assert_eq!(
            threshold.get_severity(DiagnosticCode::SchemaTableDeleted, Severity::Info),
            Severity::Warn
        );
    }

    #[test]
    fn parse_views() {
        let config = Config::from_toml(
            r#"
            define_file = "schema.json"

            [data]
            dir = "tables"
            encoding = "GBK"

            [[views]]
            own = "client"
            output = "client.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.data.dir, PathBuf::from("tables"));
        assert_eq!(config.data.encoding, "GBK");
        assert_eq!(config.data.header_rows, 2);
        assert_eq!(config.views[0].own, "client");
    }

    #[test]
    fn zero_header_rows_rejected() {
        let err = Config::from_toml("[data]\nheader_rows = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed = Config::from_toml(&toml).unwrap();
        assert_eq!(config.data, parsed.data);
        assert_eq!(config.define_file, parsed.define_file);
    }
}
