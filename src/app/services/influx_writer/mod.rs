//! InfluxDB output for fuel price points
//!
//! - [`line_protocol`] - Point serialization to InfluxDB line protocol
//! - [`sink`] - The [`PointSink`] seam and its InfluxDB HTTP implementation
//! - [`emitter`] - [`BatchEmitter`], buffering points and flushing them with bounded retries
//!
//! Prices are written as float fields straight from their exact decimal text,
//! so no binary float conversion happens on the way out. A removed fuel type
//! becomes a boolean `<Fuel>Removed=true` field since line protocol has no null.

pub mod emitter;
pub mod line_protocol;
pub mod sink;

#[cfg(test)]
pub mod tests;

pub use emitter::{BatchEmitter, EmitterStats, RetryPolicy};
pub use line_protocol::{encode_batch, encode_point};
pub use sink::{DiscardSink, InfluxDbSink, PointSink};
