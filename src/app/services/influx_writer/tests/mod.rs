//! Shared test utilities for InfluxDB output tests

use crate::app::models::{FieldValue, FuelType, Point, PointTags, Price};
use crate::app::services::influx_writer::PointSink;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub mod sink_tests;

/// In-memory sink recording every successful batch
///
/// Clones share state, so a test can keep a handle after moving the sink
/// into an emitter.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    state: Arc<Mutex<RecordingState>>,
}

#[derive(Debug, Default)]
struct RecordingState {
    batches: Vec<Vec<Point>>,
    attempts: usize,
    transient_failures: usize,
    reject: bool,
}

impl RecordingSink {
    /// Sink whose first `count` writes fail with a transient error
    pub fn failing(count: usize) -> Self {
        let sink = Self::default();
        sink.state.lock().unwrap().transient_failures = count;
        sink
    }

    /// Sink that rejects every write permanently
    pub fn rejecting() -> Self {
        let sink = Self::default();
        sink.state.lock().unwrap().reject = true;
        sink
    }

    /// All points written so far, in order
    pub fn points(&self) -> Vec<Point> {
        self.state
            .lock()
            .unwrap()
            .batches
            .iter()
            .flatten()
            .cloned()
            .collect()
    }

    /// Size of every successful batch
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.state
            .lock()
            .unwrap()
            .batches
            .iter()
            .map(Vec::len)
            .collect()
    }

    /// Number of write calls, failed ones included
    pub fn attempts(&self) -> usize {
        self.state.lock().unwrap().attempts
    }
}

#[async_trait]
impl PointSink for RecordingSink {
    async fn write(&self, points: &[Point]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.attempts += 1;

        if state.reject {
            return Err(Error::sink("write rejected"));
        }
        if state.transient_failures > 0 {
            state.transient_failures -= 1;
            return Err(Error::transient_sink("server unavailable"));
        }

        state.batches.push(points.to_vec());
        Ok(())
    }
}

/// Create a point for the test station with the given fields
pub fn create_test_point(fields: &[(FuelType, FieldValue)], epoch_secs: i64) -> Point {
    Point {
        measurement: "fuel_prices".to_string(),
        tags: PointTags {
            brand: "Esso".to_string(),
            city: "Berlin".to_string(),
            street: "Hauptstr. 1".to_string(),
        },
        fields: fields.iter().copied().collect::<BTreeMap<_, _>>(),
        timestamp: Utc.timestamp_opt(epoch_secs, 0).unwrap(),
    }
}

/// Shorthand for a price field value
pub fn price(thousandths: i64) -> FieldValue {
    FieldValue::Price(Price::from_thousandths(thousandths))
}
