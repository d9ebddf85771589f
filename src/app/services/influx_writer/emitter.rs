//! Point buffering and batched delivery

use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::sink::PointSink;
use crate::{Error, Result};
use crate::app::models::Point;
use crate::constants::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS};

/// Bounded retry of transient delivery failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first failed one
    pub max_retries: u32,
    /// Delay before the first retry, doubled for every further one
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Create a retry policy
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// Never retry
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_RETRIES,
            Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        )
    }
}

/// Delivery counters of an emitter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EmitterStats {
    /// Points delivered to the sink
    pub points_written: usize,
    /// Successful sink writes
    pub batches_written: usize,
    /// Failed attempts that were retried
    pub retries: usize,
}

/// Buffers points and writes them to a sink in batches
///
/// `submit` only writes once `batch_size` points are pending. Callers must
/// end a run with [`BatchEmitter::finish`], also after an error, so that
/// already submitted points are not lost. The buffer is only drained after
/// a successful write. Cancellation cuts a retry backoff short but never
/// skips the first attempt of a flush.
pub struct BatchEmitter<S: PointSink> {
    sink: S,
    buffer: Vec<Point>,
    batch_size: usize,
    retry: RetryPolicy,
    stats: EmitterStats,
    cancellation_token: CancellationToken,
}

impl<S: PointSink> BatchEmitter<S> {
    /// Create an emitter writing to `sink`
    pub fn new(sink: S, batch_size: usize, retry: RetryPolicy) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            sink,
            buffer: Vec::with_capacity(batch_size.min(DEFAULT_BATCH_SIZE)),
            batch_size,
            retry,
            stats: EmitterStats::default(),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Stop waiting between retries once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Queue a point, writing the buffer once it is full
    pub async fn submit(&mut self, point: Point) -> Result<()> {
        self.buffer.push(point);
        if self.buffer.len() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    /// Write all pending points
    ///
    /// On error the points stay buffered. A cancelled token ends the
    /// retries with `Error::ProcessingInterrupted`.
    pub async fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let mut attempt = 0;
        loop {
            match self.sink.write(&self.buffer).await {
                Ok(()) => break,
                Err(e) if e.is_transient() && self.cancellation_token.is_cancelled() => {
                    return Err(Error::processing_interrupted(format!(
                        "{} points not written after a failed write ({})",
                        self.buffer.len(),
                        e
                    )));
                }
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "Write of {} points failed ({}), retry {}/{} in {:?}",
                        self.buffer.len(),
                        e,
                        attempt + 1,
                        self.retry.max_retries,
                        delay
                    );
                    self.stats.retries += 1;
                    attempt += 1;
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = self.cancellation_token.cancelled() => {
                            return Err(Error::processing_interrupted(format!(
                                "{} points not written, retry cancelled",
                                self.buffer.len()
                            )));
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }

        debug!("Flushed {} points", self.buffer.len());
        self.stats.points_written += self.buffer.len();
        self.stats.batches_written += 1;
        self.buffer.clear();
        Ok(())
    }

    /// Flush remaining points and release the sink
    pub async fn finish(mut self) -> Result<EmitterStats> {
        self.flush().await?;
        Ok(self.stats)
    }

    /// Points waiting to be written
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Delivery counters so far
    pub fn stats(&self) -> EmitterStats {
        self.stats
    }

    /// The underlying sink
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S: PointSink> Drop for BatchEmitter<S> {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            warn!(
                "Discarding {} points that were never written",
                self.buffer.len()
            );
        }
    }
}
