//! Application configuration.
//!
//! Handles loading, validating, and merging `retrofx.toml`. Stock defaults
//! are serialized to a TOML table, the user's file is merged over it key by
//! key, and the result is deserialized and validated.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! upload_dir = "static/uploads"       # Staged copies of inputs (--stage)
//! processed_dir = "static/processed"  # Processed results
//!
//! [input]
//! allowed_extensions = ["png", "jpg", "jpeg", "webp", "gif"]
//! max_input_bytes = 16777216          # 16 MiB
//!
//! [processing]
//! max_processes = 4                   # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [paths]
//! processed_dir = "out"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "retrofx.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `retrofx.toml`.
///
/// All fields have defaults; a user file only specifies what it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Where staged inputs and processed outputs are written.
    pub paths: PathsConfig,
    /// Which files are accepted.
    pub input: InputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paths.upload_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "paths.upload_dir must not be empty".into(),
            ));
        }
        if self.paths.processed_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "paths.processed_dir must not be empty".into(),
            ));
        }
        if self.input.allowed_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "input.allowed_extensions must not be empty".into(),
            ));
        }
        if self
            .input
            .allowed_extensions
            .iter()
            .any(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(ConfigError::Validation(
                "input.allowed_extensions entries are bare extensions like \"png\"".into(),
            ));
        }
        if self.input.max_input_bytes == 0 {
            return Err(ConfigError::Validation(
                "input.max_input_bytes must be greater than 0".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Output folders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub upload_dir: PathBuf,
    pub processed_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("static/uploads"),
            processed_dir: PathBuf::from("static/processed"),
        }
    }
}

/// Input acceptance rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Lowercase extensions without the dot.
    pub allowed_extensions: Vec<String>,
    /// Files larger than this are rejected before decoding.
    pub max_input_bytes: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: ["png", "jpg", "jpeg", "webp", "gif"]
                .map(String::from)
                .to_vec(),
            max_input_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `path`, merged over stock defaults and validated.
///
/// A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match load_raw_config(path)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `retrofx.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# retrofx configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Folders
# ---------------------------------------------------------------------------
[paths]
# Inputs are copied here under "<timestamp>_<name>" when --stage is given.
upload_dir = "static/uploads"

# Results are written here under "processed_<timestamp>_<name>".
processed_dir = "static/processed"

# ---------------------------------------------------------------------------
# Accepted input
# ---------------------------------------------------------------------------
[input]
# File extensions accepted as input (case-insensitive, no dot).
allowed_extensions = ["png", "jpg", "jpeg", "webp", "gif"]

# Files larger than this many bytes are rejected before decoding (16 MiB).
max_input_bytes = 16777216

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers when processing several files.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
