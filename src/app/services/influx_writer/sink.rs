//! Destinations for encoded points

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::debug;

use super::line_protocol::encode_batch;
use crate::app::models::Point;
use crate::config::InfluxDbConfig;
use crate::{Error, Result};

/// Destination the batch emitter writes to
///
/// A write either stores the whole batch or fails; failures flagged as
/// transient (`Error::is_transient`) are retried by the emitter.
#[async_trait]
pub trait PointSink: Send + Sync {
    /// Write a batch of points
    async fn write(&self, points: &[Point]) -> Result<()>;
}

/// InfluxDB v2 HTTP write endpoint
#[derive(Debug)]
pub struct InfluxDbSink {
    client: reqwest::Client,
    write_url: String,
    org: String,
    bucket: String,
    token: String,
}

/// Error body returned by InfluxDB
#[derive(Debug, Deserialize)]
struct InfluxErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl InfluxDbSink {
    /// Create a sink for the configured server and bucket
    pub fn new(config: &InfluxDbConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            write_url: format!("{}/api/v2/write", config.server_url.trim_end_matches('/')),
            org: config.org.clone(),
            bucket: config.bucket.clone(),
            token: config.token.clone(),
        })
    }

    /// Endpoint points are posted to
    pub fn write_url(&self) -> &str {
        &self.write_url
    }
}

#[async_trait]
impl PointSink for InfluxDbSink {
    async fn write(&self, points: &[Point]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        debug!("Writing {} points to {}", points.len(), self.write_url);

        let response = self
            .client
            .post(&self.write_url)
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "s"),
            ])
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(encode_batch(points))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<InfluxErrorBody>(&body) {
            Ok(InfluxErrorBody {
                code,
                message: Some(message),
            }) => format!("{} ({})", message, code.unwrap_or_default()),
            _ => body,
        };
        let message = format!("InfluxDB write failed with {}: {}", status, message);

        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(Error::transient_sink(message))
        } else {
            Err(Error::sink(message))
        }
    }
}

/// Sink that only counts points, used for dry runs
#[derive(Debug, Default)]
pub struct DiscardSink {
    points: AtomicUsize,
}

impl DiscardSink {
    /// Number of points received so far
    pub fn points_received(&self) -> usize {
        self.points.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PointSink for DiscardSink {
    async fn write(&self, points: &[Point]) -> Result<()> {
        self.points.fetch_add(points.len(), Ordering::Relaxed);
        Ok(())
    }
}
