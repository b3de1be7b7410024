use crate::humanize::ByteSize;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Placeholder substituted with the formatted target date
pub const DATE_PLACEHOLDER: &str = "{date}";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Where the daily dataset lives upstream
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// URL with an optional `{date}` placeholder, e.g. `https://host/prices/{date}.csv`
    #[serde(default)]
    pub url_template: String,
    /// chrono strftime pattern used for `{date}` in both URL and file name
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url_template: String::new(),
            date_format: default_date_format(),
        }
    }
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

/// Where downloaded files are written
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_file_template")]
    pub file_template: String,
    /// Replace a file that already exists for the date instead of skipping the run
    #[serde(default)]
    pub overwrite: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            file_template: default_file_template(),
            overwrite: false,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_file_template() -> String {
    format!("{DATE_PLACEHOLDER}.dat")
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: ByteSize,
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("dailyfetch/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_body_bytes() -> ByteSize {
    ByteSize::mib(100)
}

/// Calendar rules applied before anything is fetched
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScheduleConfig {
    /// Days with no data upstream (market closed, etc.); runs on these days are skipped
    #[serde(default)]
    pub skip_weekdays: Vec<Weekday>,
    /// Take "today" from UTC instead of the local timezone
    #[serde(default)]
    pub utc: bool,
}
