//! Job runner - drives one invocation from date to stored file

use super::http::{Fetcher, HttpFetcher, NetworkError};
use super::{DownloadRecord, SkipReason, Status};
use crate::clock::Clock;
use crate::config::{Config, ConfigError};
use crate::storage::{StorageClient, StorageError};
use chrono::Datelike;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum JobError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl JobError {
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::Config(_) => "config",
            JobError::Network(_) => "network",
            JobError::Storage(_) => "storage",
        }
    }

    /// Process exit status for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            JobError::Config(_) => 1,
            JobError::Network(_) => 2,
            JobError::Storage(_) => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, JobError>;

pub struct DailyFetchJob {
    config: Config,
    clock: Arc<dyn Clock>,
    fetcher: Arc<dyn Fetcher>,
    storage: Option<StorageClient>,
}

impl DailyFetchJob {
    /// Rejects configs that fail validation, since planning renders the date format
    pub fn new(config: Config, clock: Arc<dyn Clock>, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        config.validate().map_err(ConfigError::from)?;
        Ok(Self {
            config,
            clock,
            fetcher,
            storage: None,
        })
    }

    /// Job with the real HTTP client
    pub fn from_config(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate().map_err(ConfigError::from)?;
        let fetcher = HttpFetcher::new(&config.http)?;
        Self::new(config, clock, Arc::new(fetcher))
    }

    /// Use `storage` instead of opening `output.dir`
    pub fn with_storage(mut self, storage: StorageClient) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Run once. Failures are captured in the returned record, never raised.
    pub async fn run(&self) -> DownloadRecord {
        let date = self.clock.today();
        let mut record = DownloadRecord::plan(&self.config, date);

        info!(
            date = %record.date,
            url = %record.source_url,
            path = %record.destination_path.display(),
            "Starting daily fetch"
        );

        if let Err(e) = self.execute(&mut record).await {
            record.fail(e);
        }

        log_outcome(&record);
        record
    }

    async fn execute(&self, record: &mut DownloadRecord) -> Result<()> {
        let weekday = record.date.weekday();
        if self.config.schedule.skip_weekdays.contains(&weekday) {
            record.skip(SkipReason::ClosedDay(weekday));
            return Ok(());
        }

        let storage = self.open_storage()?;

        if !self.config.output.overwrite && storage.exists(&record.destination_key).await? {
            record.skip(SkipReason::AlreadyPresent);
            return Ok(());
        }

        let body = self.fetcher.fetch(&record.source_url).await?;
        let meta = storage.put(&record.destination_key, body).await?;

        record.succeed(meta.size as u64);
        Ok(())
    }

    fn open_storage(&self) -> Result<StorageClient> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => Ok(StorageClient::local(&self.config.output.dir)?),
        }
    }
}

fn log_outcome(record: &DownloadRecord) {
    match (&record.status, &record.error) {
        (Status::Failure, Some(e)) => error!(
            date = %record.date,
            kind = e.kind(),
            error = %e,
            "{record}"
        ),
        (Status::Success, _) => info!(
            date = %record.date,
            bytes = record.bytes_written.unwrap_or_default(),
            path = %record.destination_path.display(),
            "{record}"
        ),
        _ => info!(date = %record.date, "{record}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::{NaiveDate, Weekday};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a fixed response and counts calls
    struct MockFetcher {
        response: std::result::Result<&'static [u8], u16>,
        calls: AtomicUsize,
    }

    impl MockFetcher {
        fn ok(body: &'static [u8]) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(body),
                calls: AtomicUsize::new(0),
            })
        }

        fn status(code: u16) -> Arc<Self> {
            Arc::new(Self {
                response: Err(code),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn fetch(&self, _url: &str) -> std::result::Result<Bytes, NetworkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.response {
                Ok(body) => Ok(Bytes::from_static(body)),
                Err(code) => Err(NetworkError::Status {
                    code,
                    reason: "Mock".to_string(),
                }),
            }
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.source.url_template = "http://mock/{date}".to_string();
        config
    }

    fn job(config: Config, fetcher: Arc<MockFetcher>, storage: &StorageClient) -> DailyFetchJob {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        DailyFetchJob::new(config, Arc::new(FixedClock(date)), fetcher)
            .unwrap()
            .with_storage(storage.clone())
    }

    #[tokio::test]
    async fn test_success_stores_body() {
        let storage = StorageClient::in_memory();
        let fetcher = MockFetcher::ok(b"hello");

        let record = job(test_config(), fetcher.clone(), &storage).run().await;

        assert_eq!(record.status, Status::Success);
        assert_eq!(record.bytes_written, Some(5));
        assert_eq!(record.source_url, "http://mock/2024-03-01");
        assert_eq!(storage.get("2024-03-01.dat").await.unwrap(), "hello");
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(record.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_network_failure_writes_nothing() {
        let storage = StorageClient::in_memory();
        let fetcher = MockFetcher::status(500);

        let record = job(test_config(), fetcher, &storage).run().await;

        assert_eq!(record.status, Status::Failure);
        assert!(matches!(record.error, Some(JobError::Network(_))));
        assert_eq!(record.exit_code(), 2);
        assert!(!storage.exists("2024-03-01.dat").await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_day_skips_fetch() {
        // 2024-03-01 is a Friday
        let mut config = test_config();
        config.schedule.skip_weekdays = vec![Weekday::Fri, Weekday::Sat];
        let storage = StorageClient::in_memory();
        let fetcher = MockFetcher::ok(b"hello");

        let record = job(config, fetcher.clone(), &storage).run().await;

        assert_eq!(
            record.status,
            Status::Skipped(SkipReason::ClosedDay(Weekday::Fri))
        );
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(record.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_existing_file_skips_unless_overwrite() {
        let storage = StorageClient::in_memory();
        storage
            .put("2024-03-01.dat", Bytes::from_static(b"earlier"))
            .await
            .unwrap();

        let fetcher = MockFetcher::ok(b"hello");
        let record = job(test_config(), fetcher.clone(), &storage).run().await;
        assert_eq!(record.status, Status::Skipped(SkipReason::AlreadyPresent));
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(storage.get("2024-03-01.dat").await.unwrap(), "earlier");

        let mut config = test_config();
        config.output.overwrite = true;
        let record = job(config, fetcher.clone(), &storage).run().await;
        assert_eq!(record.status, Status::Success);
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(storage.get("2024-03-01.dat").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_unwritable_output_dir_is_storage_failure() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let mut config = test_config();
        config.output.dir = blocker.join("out");
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let job = DailyFetchJob::new(
            config,
            Arc::new(FixedClock(date)),
            MockFetcher::ok(b"hello"),
        )
        .unwrap();

        let record = job.run().await;

        assert_eq!(record.status, Status::Failure);
        assert!(matches!(record.error, Some(JobError::Storage(_))));
        assert_eq!(record.exit_code(), 3);
        assert!(record.error_detail().unwrap().contains("blocker"));
    }

    #[test]
    fn test_unrenderable_date_format_is_rejected() {
        let mut config = test_config();
        config.source.date_format = "%Y-%m-%dT%H".to_string();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let result = DailyFetchJob::new(config, Arc::new(FixedClock(date)), MockFetcher::ok(b""));

        let Err(err) = result else {
            panic!("job accepted a date format it cannot render");
        };
        assert!(matches!(
            err,
            JobError::Config(ConfigError::ValidationError(
                crate::config::ValidationError::InvalidDateFormat { .. }
            ))
        ));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let network = JobError::Network(NetworkError::Timeout("slow".to_string()));
        let config = JobError::Config(ConfigError::ValidationError(
            crate::config::ValidationError::MissingSourceUrl,
        ));
        assert_eq!(network.kind(), "network");
        assert_eq!(config.kind(), "config");
        assert_ne!(network.exit_code(), config.exit_code());
        assert_ne!(network.exit_code(), 0);
        assert_ne!(config.exit_code(), 0);
    }
}
