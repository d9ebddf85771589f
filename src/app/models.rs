//! Data models for fuel price ingestion
//!
//! This module contains the core data structures for representing configured
//! fuel stations, raw change log rows and the points written to InfluxDB.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

mod change_code;
mod price;

pub use change_code::ChangeCode;
pub use price::Price;

// =============================================================================
// Station Metadata Structure
// =============================================================================

/// A configured fuel station
///
/// Stations are loaded once from the configuration file and never change
/// during a run. The id is the Tankerkoenig station UUID as it appears in
/// the second column of the change log.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Station {
    /// Unique station identifier - primary key for lookups
    pub id: String,

    /// Brand name (e.g. "Esso", "ARAL")
    pub brand: String,

    /// City the station is located in
    pub city: String,

    /// Street address
    pub street: String,
}

impl Station {
    /// Create a new Station with validation
    pub fn new(
        id: impl Into<String>,
        brand: impl Into<String>,
        city: impl Into<String>,
        street: impl Into<String>,
    ) -> Result<Self> {
        let station = Self {
            id: id.into(),
            brand: brand.into(),
            city: city.into(),
            street: street.into(),
        };

        station.validate()?;
        Ok(station)
    }

    /// Validate station data
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::configuration(format!(
                "Station id cannot be empty (brand '{}', street '{}')",
                self.brand, self.street
            )));
        }

        if self.id.trim() != self.id {
            return Err(Error::configuration(format!(
                "Station id '{}' has leading or trailing whitespace",
                self.id
            )));
        }

        for (name, value) in [
            ("brand", &self.brand),
            ("city", &self.city),
            ("street", &self.street),
        ] {
            validate_tag_value(value).map_err(|reason| {
                Error::configuration(format!(
                    "Station {} {} '{}' {}",
                    self.id,
                    name,
                    value.escape_debug(),
                    reason
                ))
            })?;
        }

        Ok(())
    }
}

/// Check that a value can be written as a line protocol tag value
///
/// Line breaks end the line and a trailing backslash escapes the separator
/// in front of the field set; neither can be escaped.
pub fn validate_tag_value(value: &str) -> std::result::Result<(), &'static str> {
    if value.contains(['\n', '\r']) {
        return Err("contains a line break");
    }
    if value.ends_with('\\') {
        return Err("ends with a backslash");
    }
    Ok(())
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, {} ({})", self.brand, self.street, self.city, self.id)
    }
}

// =============================================================================
// Fuel Types
// =============================================================================

/// Fuel types reported in the change log
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Diesel,
    E5,
    E10,
}

impl FuelType {
    /// All fuel types in column order
    pub const ALL: [FuelType; 3] = [FuelType::Diesel, FuelType::E5, FuelType::E10];

    /// Field key used in the output point
    pub fn field_name(self) -> &'static str {
        match self {
            FuelType::Diesel => "Diesel",
            FuelType::E5 => "E5",
            FuelType::E10 => "E10",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

// =============================================================================
// Raw Change Log Record
// =============================================================================

/// One change log row for a configured station
///
/// Prices are kept as text: a price is only parsed when its change code says
/// the value changed, since removed fuels often carry placeholder prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub timestamp: String,
    pub station_id: String,
    pub diesel_price: String,
    pub e5_price: String,
    pub e10_price: String,
    pub diesel_change: ChangeCode,
    pub e5_change: ChangeCode,
    pub e10_change: ChangeCode,
}

impl RawRecord {
    /// Price text for a fuel type
    pub fn price_text(&self, fuel: FuelType) -> &str {
        match fuel {
            FuelType::Diesel => &self.diesel_price,
            FuelType::E5 => &self.e5_price,
            FuelType::E10 => &self.e10_price,
        }
    }

    /// Change code for a fuel type
    pub fn change(&self, fuel: FuelType) -> ChangeCode {
        match fuel {
            FuelType::Diesel => self.diesel_change,
            FuelType::E5 => self.e5_change,
            FuelType::E10 => self.e10_change,
        }
    }

    /// Whether any fuel type reports a change
    pub fn has_changes(&self) -> bool {
        FuelType::ALL.iter().any(|&fuel| self.change(fuel).is_change())
    }
}

// =============================================================================
// Output Point
// =============================================================================

/// Value of a single fuel field in a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    /// New or changed price
    Price(Price),
    /// The station no longer reports this fuel type
    Removed,
}

impl FieldValue {
    /// Price carried by this field, if any
    pub fn price(&self) -> Option<Price> {
        match self {
            FieldValue::Price(price) => Some(*price),
            FieldValue::Removed => None,
        }
    }
}

/// Station metadata attached to every point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointTags {
    pub brand: String,
    pub city: String,
    pub street: String,
}

impl From<&Station> for PointTags {
    fn from(station: &Station) -> Self {
        Self {
            brand: station.brand.clone(),
            city: station.city.clone(),
            street: station.street.clone(),
        }
    }
}

/// One timestamped set of changed fuel fields for a station
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    pub measurement: String,
    pub tags: PointTags,
    /// Only fuel types whose change code was not `Unchanged`
    pub fields: BTreeMap<FuelType, FieldValue>,
    pub timestamp: DateTime<Utc>,
}

impl Point {
    /// Field for a fuel type, `None` when the fuel did not change
    pub fn field(&self, fuel: FuelType) -> Option<&FieldValue> {
        self.fields.get(&fuel)
    }

    /// Number of fields carrying a price
    pub fn price_field_count(&self) -> usize {
        self.fields
            .values()
            .filter(|value| value.price().is_some())
            .count()
    }
}
