//! Transfer configuration
//!
//! Settings can be built in code or parsed from TOML:
//!
//! ```toml
//! [transfer]
//! default_driver = "GTiff"
//! rows_per_block = 64
//!
//! [creation_options]
//! COMPRESS = "DEFLATE"
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! Every section and key is optional; missing values keep their defaults.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::LevelFilter;

use crate::codec::CreationOptions;
use crate::errors::{RasterError, RasterResult};
use crate::utils::logger::init_env_logger;

/// Driver used by the write path when the caller names none
pub const DEFAULT_DRIVER: &str = "GTiff";

/// Settings shared by the read and write paths
#[derive(Debug, Clone, PartialEq)]
pub struct TransferConfig {
    /// Driver short name for writes without an explicit driver
    pub default_driver: String,
    /// Rows moved per collaborator call; the scratch buffer holds this many rows
    pub rows_per_block: usize,
    /// Options handed to the driver when an image is created
    pub creation_options: CreationOptions,
    /// Level used when the crate installs a logger
    pub log_level: LevelFilter,
}

impl Default for TransferConfig {
    fn default() -> Self {
        TransferConfig {
            default_driver: DEFAULT_DRIVER.to_string(),
            rows_per_block: 1,
            creation_options: CreationOptions::new(),
            log_level: LevelFilter::Info,
        }
    }
}

impl TransferConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_driver(mut self, driver: &str) -> Self {
        self.default_driver = driver.to_string();
        self
    }

    /// Sets the row block size; 0 is treated as 1
    pub fn with_rows_per_block(mut self, rows: usize) -> Self {
        self.rows_per_block = rows.max(1);
        self
    }

    pub fn with_creation_option(mut self, key: &str, value: &str) -> Self {
        self.creation_options.set(key, value);
        self
    }

    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    /// Loads a configuration from a TOML file
    pub fn from_file(path: &Path) -> RasterResult<Self> {
        let contents = fs::read_to_string(path)?;
        contents.parse()
    }

    /// Installs the env_logger backend at `log_level`
    ///
    /// `RUST_LOG` still overrides the level. Returns false when a logger is
    /// already installed.
    pub fn init_logging(&self) -> bool {
        init_env_logger(self.log_level)
    }
}

impl FromStr for TransferConfig {
    type Err = RasterError;

    /// Parses a configuration from TOML text
    fn from_str(content: &str) -> RasterResult<Self> {
        let toml_value: toml::Value = content.parse()
            .map_err(|e| RasterError::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut config = TransferConfig::default();

        if let Some(transfer) = toml_value.get("transfer") {
            let table = transfer.as_table()
                .ok_or_else(|| RasterError::Config("[transfer] must be a table".to_string()))?;

            if let Some(value) = table.get("default_driver") {
                let driver = value.as_str()
                    .ok_or_else(|| RasterError::Config("default_driver must be a string".to_string()))?;
                config.default_driver = driver.to_string();
            }

            if let Some(value) = table.get("rows_per_block") {
                let rows = value.as_integer()
                    .filter(|&rows| rows >= 1)
                    .ok_or_else(|| RasterError::Config(format!(
                        "rows_per_block must be a positive integer, got {}", value)))?;
                config.rows_per_block = usize::try_from(rows)
                    .map_err(|_| RasterError::Config(format!("rows_per_block {} is too large", rows)))?;
            }
        }

        if let Some(options) = toml_value.get("creation_options") {
            let table = options.as_table()
                .ok_or_else(|| RasterError::Config("[creation_options] must be a table".to_string()))?;
            for (key, value) in table {
                // Numbers and booleans are accepted as their TOML text
                let text = match value {
                    toml::Value::String(s) => s.clone(),
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Boolean(b) => if *b { "YES".to_string() } else { "NO".to_string() },
                    other => return Err(RasterError::Config(format!(
                        "Creation option {} has unsupported value {}", key, other))),
                };
                config.creation_options.set(key, &text);
            }
        }

        if let Some(level) = toml_value.get("logging").and_then(|v| v.get("level")) {
            let name = level.as_str()
                .ok_or_else(|| RasterError::Config("logging.level must be a string".to_string()))?;
            config.log_level = LevelFilter::from_str(name)
                .map_err(|_| RasterError::Config(format!("Unknown log level '{}'", name)))?;
        }

        Ok(config)
    }
}
