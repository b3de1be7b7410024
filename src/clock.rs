//! Where the job gets "today" from

use chrono::{Local, NaiveDate, Utc};

/// Source of the calendar date a run fetches data for
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall-clock date, local or UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    utc: bool,
}

impl SystemClock {
    pub fn new(utc: bool) -> Self {
        Self { utc }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        if self.utc {
            Utc::now().date_naive()
        } else {
            Local::now().date_naive()
        }
    }
}

/// Always reports the same date (backfills and tests)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
