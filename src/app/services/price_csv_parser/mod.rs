//! Change log parser for daily fuel price files
//!
//! Reads the Tankerkoenig price change logs (eight columns, one row per price
//! change event) and feeds rows for configured stations through the record
//! transformer into the batch emitter.
//!
//! ## Architecture
//!
//! - [`parser`] - Per-file reading loop and station matching
//! - [`record_parser`] - Individual CSV row to [`RawRecord`](crate::app::models::RawRecord)
//! - [`field_parsers`] - Field access and timestamp parsing
//! - [`stats`] - Per-file statistics
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fuelprice_ingest::app::services::influx_writer::{BatchEmitter, DiscardSink, RetryPolicy};
//! use fuelprice_ingest::app::services::price_csv_parser::PriceFileReader;
//! use fuelprice_ingest::app::services::record_transformer::RecordTransformer;
//! use fuelprice_ingest::app::services::station_registry::StationIndex;
//!
//! # async fn example(index: StationIndex) -> fuelprice_ingest::Result<()> {
//! let reader = PriceFileReader::new(&index, RecordTransformer::new("fuel_prices"));
//! let mut emitter = BatchEmitter::new(DiscardSink::default(), 5000, RetryPolicy::default());
//!
//! let stats = reader
//!     .ingest_file(std::path::Path::new("2022-02-04-prices.csv"), &mut emitter)
//!     .await?;
//! println!("{} points from {} rows", stats.points_emitted, stats.total_rows);
//! emitter.finish().await?;
//! # Ok(())
//! # }
//! ```

pub mod field_parsers;
pub mod parser;
pub mod record_parser;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use field_parsers::parse_timestamp;
pub use parser::PriceFileReader;
pub use record_parser::parse_raw_record;
pub use stats::ParseStats;
