//! Configuration management for dailyfetch
//!
//! Settings are layered, lowest priority first:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. `.env` file
//! 4. Environment variables
//!
//! # Usage
//!
//! ```no_run
//! use dailyfetch::config::Config;
//!
//! let config = Config::load(None).expect("Failed to load configuration");
//! println!("Writing to: {}", config.output.dir.display());
//! ```
//!
//! # Environment Variables
//!
//! Any key can be overridden with `DAILYFETCH__<section>__<key>`:
//! - `DAILYFETCH__SOURCE__URL_TEMPLATE=https://host/prices/{date}.csv`
//! - `DAILYFETCH__OUTPUT__DIR=/var/lib/dailyfetch`
//! - `DAILYFETCH__HTTP__TIMEOUT_SECS=30`
//!
//! # Configuration File
//!
//! The file is `config/dailyfetch.toml` unless `--config` or `DAILYFETCH_CONFIG` says otherwise.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{
    Config, DATE_PLACEHOLDER, HttpConfig, OutputConfig, ScheduleConfig, SourceConfig,
};
pub use validation::ValidationError;

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// `path` takes precedence over `DAILYFETCH_CONFIG` and the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed or validation fails.
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path, skipping `.env`
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Check a programmatically built config
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }

    /// Source URL for `date`. Panics on a `date_format` that `validate` rejects.
    pub fn source_url(&self, date: NaiveDate) -> String {
        self.source
            .url_template
            .replace(DATE_PLACEHOLDER, &self.format_date(date))
    }

    /// Output file name (object key) for `date`. Same precondition as `source_url`.
    pub fn file_name(&self, date: NaiveDate) -> String {
        self.output
            .file_template
            .replace(DATE_PLACEHOLDER, &self.format_date(date))
    }

    fn format_date(&self, date: NaiveDate) -> String {
        date.format(&self.source.date_format).to_string()
    }
}
