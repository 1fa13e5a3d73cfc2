//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and environment
//! variables and merging them with proper precedence rules:
//! XDG < global < local file < `NP_*` environment < command-line flags.

use crate::error::NetparseError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// How parsed records are rendered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = NetparseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(NetparseError::config(format!(
                "Invalid output format '{}'. Use one of: text, json, csv",
                other
            ))),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Output formatting preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Reject domains whose suffix has no manager
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    /// Default output format ("text", "json" or "csv")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Pretty-print JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,

    /// Include CSV headers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_headers: Option<bool>,
}

/// Fully resolved settings after all sources are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub strict: bool,
    pub format: OutputFormat,
    pub pretty: bool,
    pub csv_headers: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strict: false,
            format: OutputFormat::Text,
            pretty: false,
            csv_headers: true,
        }
    }
}

impl Settings {
    /// Overlay values set in a configuration file.
    pub fn apply_file(mut self, config: &FileConfig) -> Result<Self, NetparseError> {
        if let Some(defaults) = &config.defaults {
            if let Some(strict) = defaults.strict {
                self.strict = strict;
            }
            if let Some(format) = &defaults.format {
                self.format = format.parse()?;
            }
        }
        if let Some(output) = &config.output {
            if let Some(pretty) = output.pretty {
                self.pretty = pretty;
            }
            if let Some(csv_headers) = output.csv_headers {
                self.csv_headers = csv_headers;
            }
        }
        Ok(self)
    }

    /// Overlay values set through `NP_*` environment variables.
    pub fn apply_env(mut self, env_config: &EnvConfig) -> Self {
        if let Some(strict) = env_config.strict {
            self.strict = strict;
        }
        if let Some(format) = env_config.format {
            self.format = format;
        }
        self
    }
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Default)]
pub struct ConfigManager {
    /// Directory searched for local config files; the working directory if unset
    local_dir: Option<PathBuf>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search `dir` instead of the working directory for local config files.
    pub fn with_local_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.local_dir = Some(dir.into());
        self
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// [`NetparseError::FileError`] if the file is missing or unreadable,
    /// [`NetparseError::ConfigError`] if it is not valid configuration.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, NetparseError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(NetparseError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            NetparseError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;

        self.validate_config(&config)?;

        debug!(path = %path.display(), "loaded configuration file");

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// Files that fail to load are skipped with a warning.
    pub fn discover_and_load(&self) -> FileConfig {
        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        candidates
            .into_iter()
            .flatten()
            .fold(FileConfig::default(), |merged, path| match self.load_file(&path) {
                Ok(config) => self.merge_configs(merged, config),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring configuration file");
                    merged
                }
            })
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let dir = self.local_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        ["netparse.toml", ".netparse.toml"]
            .iter()
            .map(|candidate| dir.join(candidate))
            .find(|path| path.exists())
    }

    /// Get the global configuration file path in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".netparse.toml", "netparse.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("netparse").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations; values from `higher` win.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower_defaults), Some(higher_defaults)) => Some(DefaultsConfig {
                    strict: higher_defaults.strict.or(lower_defaults.strict),
                    format: higher_defaults.format.or(lower_defaults.format),
                }),
                (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
            },
            output: match (lower.output, higher.output) {
                (Some(lower_output), Some(higher_output)) => Some(OutputConfig {
                    pretty: higher_output.pretty.or(lower_output.pretty),
                    csv_headers: higher_output.csv_headers.or(lower_output.csv_headers),
                }),
                (lower_output, higher_output) => higher_output.or(lower_output),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), NetparseError> {
        if let Some(format) = config.defaults.as_ref().and_then(|d| d.format.as_deref()) {
            format.parse::<OutputFormat>()?;
        }
        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub strict: Option<bool>,
    pub format: Option<OutputFormat>,
    pub config: Option<String>,
}

/// Load configuration from `NP_*` environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    env_config_from(|key| env::var(key).ok())
}

/// Build an [`EnvConfig`] from any variable lookup.
pub fn env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    // NP_STRICT - reject unmanaged suffixes
    if let Some(val) = lookup("NP_STRICT") {
        match parse_bool(&val) {
            Some(strict) => {
                debug!(strict, "using NP_STRICT");
                env_config.strict = Some(strict);
            }
            None => warn!(value = %val, "invalid NP_STRICT, use true/false"),
        }
    }

    // NP_FORMAT - output format
    if let Some(val) = lookup("NP_FORMAT") {
        match val.parse::<OutputFormat>() {
            Ok(format) => {
                debug!(%format, "using NP_FORMAT");
                env_config.format = Some(format);
            }
            Err(_) => warn!(value = %val, "invalid NP_FORMAT, use text/json/csv"),
        }
    }

    // NP_CONFIG - explicit config file
    if let Some(path) = lookup("NP_CONFIG") {
        if !path.trim().is_empty() {
            debug!(%path, "using NP_CONFIG");
            env_config.config = Some(path);
        }
    }

    env_config
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
