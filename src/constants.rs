//! Application constants for the fuel price ingester
//!
//! Column layout of the change log files, output naming and default values
//! used throughout the crate.

// =============================================================================
// Change Log Column Layout
// =============================================================================

/// Number of columns in a change log row
pub const COLUMN_COUNT: usize = 8;

/// Column positions within a change log row
pub mod columns {
    pub const TIMESTAMP: usize = 0;
    pub const STATION_ID: usize = 1;
    pub const DIESEL_PRICE: usize = 2;
    pub const E5_PRICE: usize = 3;
    pub const E10_PRICE: usize = 4;
    pub const DIESEL_CHANGE: usize = 5;
    pub const E5_CHANGE: usize = 6;
    pub const E10_CHANGE: usize = 7;
}

/// First field of the header row found in the published daily dumps
pub const HEADER_FIRST_FIELD: &str = "date";

// =============================================================================
// Price and Timestamp Format
// =============================================================================

/// Fractional digits carried by source prices (thousandths of a euro)
pub const PRICE_SCALE: u32 = 3;

/// Length of the `YYYY-MM-DD` date component
pub const DATE_COMPONENT_LEN: usize = 10;

/// Shortest acceptable timestamp: date, separator, `HH:MM:SS` and a one character offset (`Z`)
pub const MIN_TIMESTAMP_LEN: usize = DATE_COMPONENT_LEN + 1 + 8 + 1;

// =============================================================================
// Output Naming
// =============================================================================

/// Tag keys attached to every point
pub mod tags {
    pub const BRAND: &str = "Brand";
    pub const CITY: &str = "City";
    pub const STREET: &str = "Street";
}

/// Suffix of the boolean field written for a fuel type that was removed
pub const REMOVED_FIELD_SUFFIX: &str = "Removed";

// =============================================================================
// Ingest Defaults
// =============================================================================

/// Points buffered before the emitter flushes on its own
pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// Delivery attempts after the first failed one
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay before the first retry, doubled on every further attempt
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// HTTP request timeout for writes
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Error messages kept per file for the final report
pub const MAX_REPORTED_ERRORS: usize = 20;

// =============================================================================
// Environment and Paths
// =============================================================================

/// Overrides `influxDb.token` from the configuration file
pub const ENV_INFLUXDB_TOKEN: &str = "INFLUXDB_TOKEN";

/// Overrides `influxDb.serverUrl` from the configuration file
pub const ENV_INFLUXDB_URL: &str = "INFLUXDB_URL";

/// Directory below the user config dir holding the default config file
pub const CONFIG_DIR_NAME: &str = "fuelprice-ingest";

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "config.json";
