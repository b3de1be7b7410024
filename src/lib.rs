pub mod clock;
pub mod config;
pub mod humanize;
pub mod observability;
pub mod storage;
pub mod worker;
