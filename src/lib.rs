//! Fuel Price Ingest Library
//!
//! Converts the daily Tankerkoenig fuel price change logs (one CSV file per day,
//! one row per price change event) into InfluxDB points for a configured set of
//! fuel stations.
//!
//! This library provides tools for:
//! - Indexing the configured stations for O(1) lookups by station id
//! - Decoding per-fuel change codes and exact fixed-point prices
//! - Parsing change log timestamps into UTC instants
//! - Turning one change log row into at most one point holding only changed fields
//! - Buffering points and writing them to InfluxDB in batches

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod influx_writer;
        pub mod price_csv_parser;
        pub mod record_transformer;
        pub mod station_registry;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{ChangeCode, FieldValue, FuelType, Point, Price, RawRecord, Station};
pub use config::Config;

/// Result type alias for the fuel price ingester
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for fuel price ingestion
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV reading error
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Missing or malformed configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Two configured stations share an identifier
    #[error("Duplicate station id in configuration: {id}")]
    DuplicateStation { id: String },

    /// Change code outside '0'..='3'
    #[error("Invalid change code: '{value}'")]
    InvalidChangeCode { value: String },

    /// Price text is not a non-negative decimal with up to three fractional digits
    #[error("Invalid price '{value}': {reason}")]
    InvalidPrice { value: String, reason: String },

    /// Timestamp cannot be decomposed into calendar and clock fields
    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// Row does not have the expected shape
    #[error("Malformed record: {message}")]
    MalformedRecord { message: String },

    /// Buffered points could not be delivered
    #[error("Sink error: {message}")]
    Sink {
        message: String,
        /// Whether a retry may succeed
        transient: bool,
    },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a duplicate station error
    pub fn duplicate_station(id: impl Into<String>) -> Self {
        Self::DuplicateStation { id: id.into() }
    }

    /// Create an invalid change code error
    pub fn invalid_change_code(value: impl Into<String>) -> Self {
        Self::InvalidChangeCode {
            value: value.into(),
        }
    }

    /// Create an invalid price error
    pub fn invalid_price(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPrice {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid timestamp error
    pub fn invalid_timestamp(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed record error
    pub fn malformed_record(message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            message: message.into(),
        }
    }

    /// Create a sink error that will not go away on retry
    pub fn sink(message: impl Into<String>) -> Self {
        Self::Sink {
            message: message.into(),
            transient: false,
        }
    }

    /// Create a sink error that may succeed when retried
    pub fn transient_sink(message: impl Into<String>) -> Self {
        Self::Sink {
            message: message.into(),
            transient: true,
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// Row-level errors skip the offending row; everything else ends the run
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            Self::InvalidChangeCode { .. }
                | Self::InvalidPrice { .. }
                | Self::InvalidTimestamp { .. }
                | Self::MalformedRecord { .. }
        )
    }

    /// Whether a sink error is worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Sink { transient: true, .. })
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Configuration {
            message: format!("Invalid JSON: {}", error),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        // Connection problems and timeouts are worth another attempt
        let transient = error.is_connect() || error.is_timeout() || error.is_request();
        Self::Sink {
            message: format!("HTTP request failed: {}", error),
            transient,
        }
    }
}
