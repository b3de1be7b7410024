mod cli;

use clap::Parser;
use cli::Cli;
use dailyfetch::clock::{Clock, FixedClock, SystemClock};
use dailyfetch::config::Config;
use dailyfetch::observability;
use dailyfetch::worker::runner::{DailyFetchJob, JobError};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    observability::init_logging(cli.quiet);

    let mut config = match Config::load(cli.config) {
        Ok(config) => config,
        Err(e) => return fail(e.into()),
    };
    if cli.force {
        config.output.overwrite = true;
    }

    let clock: Arc<dyn Clock> = match cli.date {
        Some(date) => Arc::new(FixedClock(date)),
        None => Arc::new(SystemClock::new(config.schedule.utc)),
    };

    let job = match DailyFetchJob::from_config(config, clock) {
        Ok(job) => job,
        Err(e) => return fail(e),
    };

    let record = job.run().await;
    ExitCode::from(record.exit_code())
}

fn fail(e: JobError) -> ExitCode {
    error!(kind = e.kind(), error = %e, "Daily fetch could not start");
    ExitCode::from(e.exit_code())
}
