use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dailyfetch", version)]
#[command(about = "Download today's dataset to a dated file", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Fetch data for this date (YYYY-MM-DD) instead of today
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Replace the file if it was already downloaded for the date
    #[arg(long)]
    pub force: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}
