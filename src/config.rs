//! Configuration loading and validation.
//!
//! The configuration is a JSON document holding the stations to track, the
//! InfluxDB connection and optional ingest tuning. It is loaded once at start
//! up (file, then environment overrides) and passed around by reference.

use crate::app::models::{Station, validate_tag_value};
use crate::app::services::influx_writer::RetryPolicy;
use crate::app::services::station_registry::StationIndex;
use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_BATCH_SIZE, DEFAULT_MAX_RETRIES,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_DELAY_MS, ENV_INFLUXDB_TOKEN, ENV_INFLUXDB_URL,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Complete ingester configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Stations whose price changes are ingested
    pub stations: Vec<Station>,

    /// InfluxDB connection
    pub influx_db: InfluxDbConfig,

    /// Batching, retry and row handling settings
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// InfluxDB connection settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluxDbConfig {
    pub server_url: String,
    pub token: String,
    pub bucket: String,
    pub org: String,
    pub measurement: String,
}

// Keep the token out of debug logs
impl fmt::Debug for InfluxDbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfluxDbConfig")
            .field("server_url", &self.server_url)
            .field("token", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("org", &self.org)
            .field("measurement", &self.measurement)
            .finish()
    }
}

/// Ingest tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IngestConfig {
    /// Points buffered before a write
    pub batch_size: usize,

    /// Retries of a transiently failed write
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds
    pub retry_delay_ms: u64,

    /// HTTP timeout per write in seconds
    pub request_timeout_secs: u64,

    /// Ignore negative placeholder prices on change events
    pub skip_negative_prices: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            skip_negative_prices: true,
        }
    }
}

impl IngestConfig {
    /// Retry policy for the batch emitter
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    /// HTTP request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Load configuration: file, then environment overrides, then validation
    ///
    /// Without an explicit path the default location
    /// `<config dir>/fuelprice-ingest/config.json` is used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };
        info!("Using config file: {}", path.display());

        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Read and parse a configuration file without overrides or validation
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "Failed to read configuration file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json_str(&content).map_err(|e| {
            Error::configuration(format!(
                "Failed to parse configuration file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Parse configuration from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Default configuration file location
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                Error::configuration("Could not determine user config directory; pass --config")
            })
    }

    /// Apply overrides for the InfluxDB token and server URL
    ///
    /// `lookup` resolves an environment variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_INFLUXDB_TOKEN).filter(|v| !v.is_empty()) {
            debug!("Using InfluxDB token from {}", ENV_INFLUXDB_TOKEN);
            self.influx_db.token = token;
        }
        if let Some(url) = lookup(ENV_INFLUXDB_URL).filter(|v| !v.is_empty()) {
            debug!("Using InfluxDB URL from {}", ENV_INFLUXDB_URL);
            self.influx_db.server_url = url;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.stations.is_empty() {
            return Err(Error::configuration("No stations configured"));
        }
        for station in &self.stations {
            station.validate()?;
        }

        let influx = &self.influx_db;
        for (name, value) in [
            ("influxDb.serverUrl", &influx.server_url),
            ("influxDb.bucket", &influx.bucket),
            ("influxDb.org", &influx.org),
            ("influxDb.measurement", &influx.measurement),
        ] {
            if value.trim().is_empty() {
                return Err(Error::configuration(format!("{} cannot be empty", name)));
            }
        }

        validate_tag_value(&influx.measurement).map_err(|reason| {
            Error::configuration(format!("influxDb.measurement {}", reason))
        })?;

        if !influx.server_url.starts_with("http://") && !influx.server_url.starts_with("https://")
        {
            return Err(Error::configuration(format!(
                "influxDb.serverUrl must start with http:// or https://, got '{}'",
                influx.server_url
            )));
        }

        if self.ingest.batch_size == 0 {
            return Err(Error::configuration("ingest.batchSize must be greater than 0"));
        }

        Ok(())
    }

    /// Build the station index from the configured stations
    pub fn station_index(&self) -> Result<StationIndex> {
        StationIndex::build(self.stations.iter().cloned())
    }
}
