//! HTTP client for downloading the daily payload

use crate::config::HttpConfig;
use crate::humanize::ByteSize;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP {code} {reason}")]
    Status { code: u16, reason: String },

    #[error("response body exceeds {limit} ({size} bytes)")]
    BodyTooLarge { size: u64, limit: ByteSize },

    #[error("HTTP request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            NetworkError::InvalidUrl(e.to_string())
        } else if e.is_timeout() {
            NetworkError::Timeout(e.to_string())
        } else if e.is_connect() {
            NetworkError::Connect(e.to_string())
        } else {
            NetworkError::Request(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;

/// Fetches one resource in full
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// reqwest-backed fetcher, one attempt per call
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: ByteSize,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| NetworkError::Request(e.to_string()))?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }

    fn too_large(&self, size: u64) -> NetworkError {
        NetworkError::BodyTooLarge {
            size,
            limit: self.max_body_bytes,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        debug!(url, "Starting download");

        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let limit = self.max_body_bytes.as_u64();
        if let Some(length) = response.content_length().filter(|&len| len > limit) {
            return Err(self.too_large(length));
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            let received = (body.len() + chunk.len()) as u64;
            if received > limit {
                return Err(self.too_large(received));
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url, size = body.len(), "Download completed");

        Ok(body.freeze())
    }
}
