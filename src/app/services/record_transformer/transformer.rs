//! Row to point transformation

use std::collections::BTreeMap;

use tracing::debug;

use crate::Result;
use crate::app::models::{FieldValue, FuelType, Point, PointTags, Price, RawRecord, Station};
use crate::app::services::price_csv_parser::parse_timestamp;
use crate::config::Config;

/// Converts change log rows into points
#[derive(Debug, Clone)]
pub struct RecordTransformer {
    /// Measurement name of every produced point
    measurement: String,
    /// Drop negative placeholder prices (`-0.001`) instead of rejecting the row
    skip_negative_prices: bool,
}

impl RecordTransformer {
    /// Create a transformer writing to `measurement`
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            skip_negative_prices: true,
        }
    }

    /// Create a transformer from the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.influx_db.measurement.clone())
            .with_skip_negative_prices(config.ingest.skip_negative_prices)
    }

    /// Choose how negative placeholder prices on a change are handled
    pub fn with_skip_negative_prices(mut self, skip: bool) -> Self {
        self.skip_negative_prices = skip;
        self
    }

    /// Measurement name used for points
    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    /// Transform a row of `station` into a point, or `None` if nothing changed
    ///
    /// # Errors
    /// * `Error::InvalidPrice` if a changed or new price cannot be parsed
    /// * `Error::InvalidTimestamp` if the row yields fields but its timestamp is invalid
    pub fn transform(&self, record: &RawRecord, station: &Station) -> Result<Option<Point>> {
        let mut fields = BTreeMap::new();

        for fuel in FuelType::ALL {
            let change = record.change(fuel);
            if !change.is_change() {
                continue;
            }

            // The price column of a removed fuel is not meaningful
            if !change.carries_price() {
                fields.insert(fuel, FieldValue::Removed);
                continue;
            }

            let text = record.price_text(fuel);
            if self.skip_negative_prices && text.trim_start().starts_with('-') {
                debug!(
                    "Ignoring negative {} price '{}' for station {}",
                    fuel, text, station.id
                );
                continue;
            }
            fields.insert(fuel, FieldValue::Price(Price::parse(text)?));
        }

        if fields.is_empty() {
            return Ok(None);
        }

        let timestamp = parse_timestamp(&record.timestamp)?;

        Ok(Some(Point {
            measurement: self.measurement.clone(),
            tags: PointTags::from(station),
            fields,
            timestamp,
        }))
    }
}
