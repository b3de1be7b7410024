//! The daily fetch job
//!
//! One invocation plans a [`DownloadRecord`] for the target date, fetches the
//! source URL, stores the body under a date-derived name and logs the outcome.
//! Scheduling belongs to cron, e.g.:
//!
//! ```text
//! 30 15 * * * cd /srv/dailyfetch && ./dailyfetch >> fetch.log 2>&1
//! ```

pub mod http;
pub mod runner;

use crate::config::Config;
use crate::humanize::ByteSize;
use chrono::{NaiveDate, Weekday};
use runner::JobError;
use std::fmt;
use std::path::PathBuf;

/// Why a run finished without fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ClosedDay(Weekday),
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pending,
    Success,
    Skipped(SkipReason),
    Failure,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Success => "success",
            Status::Skipped(_) => "skipped",
            Status::Failure => "failure",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs and outcome of a single invocation
#[derive(Debug)]
pub struct DownloadRecord {
    pub date: NaiveDate,
    pub source_url: String,
    /// Storage key (the file name)
    pub destination_key: String,
    pub destination_path: PathBuf,
    pub status: Status,
    pub bytes_written: Option<u64>,
    pub error: Option<JobError>,
}

impl DownloadRecord {
    /// Derive URL and destination for `date`
    pub fn plan(config: &Config, date: NaiveDate) -> Self {
        let destination_key = config.file_name(date);
        Self {
            date,
            source_url: config.source_url(date),
            destination_path: config.output.dir.join(&destination_key),
            destination_key,
            status: Status::Pending,
            bytes_written: None,
            error: None,
        }
    }

    pub fn succeed(&mut self, bytes: u64) {
        self.status = Status::Success;
        self.bytes_written = Some(bytes);
    }

    pub fn skip(&mut self, reason: SkipReason) {
        self.status = Status::Skipped(reason);
    }

    pub fn fail(&mut self, error: JobError) {
        self.status = Status::Failure;
        self.error = Some(error);
    }

    pub fn error_detail(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// 0 unless the run failed
    pub fn exit_code(&self) -> u8 {
        self.error.as_ref().map_or(0, JobError::exit_code)
    }
}

/// One plain-text line, always starting with the date
impl fmt::Display for DownloadRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.status)?;
        match self.status {
            Status::Pending => write!(
                f,
                " {} -> {}",
                self.source_url,
                self.destination_path.display()
            ),
            Status::Success => {
                let bytes = self.bytes_written.unwrap_or_default();
                write!(
                    f,
                    " {} bytes ({}) -> {}",
                    bytes,
                    ByteSize(bytes),
                    self.destination_path.display()
                )
            }
            Status::Skipped(SkipReason::ClosedDay(weekday)) => {
                write!(f, " ({weekday} is a closed day)")
            }
            Status::Skipped(SkipReason::AlreadyPresent) => write!(
                f,
                " ({} already exists)",
                self.destination_path.display()
            ),
            Status::Failure => match &self.error {
                Some(error) => write!(f, ": {} ({})", error, self.source_url),
                None => write!(f, " ({})", self.source_url),
            },
        }
    }
}
