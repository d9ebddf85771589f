//! Parsing statistics for change log files

use crate::constants::MAX_REPORTED_ERRORS;
use serde::Serialize;

/// Row counts for one change log file
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseStats {
    /// File the statistics belong to
    pub file: String,

    /// Total number of rows read, header included
    pub total_rows: usize,

    /// Header rows skipped
    pub header_rows: usize,

    /// Rows for stations that are not configured
    pub unknown_station_rows: usize,

    /// Rows for configured stations
    pub matched_rows: usize,

    /// Matched rows that produced a point
    pub points_emitted: usize,

    /// Matched rows in which no fuel type changed
    pub unchanged_rows: usize,

    /// Matched rows whose only changes carried negative placeholder prices
    pub placeholder_rows: usize,

    /// Rows skipped because they could not be parsed
    pub rows_skipped: usize,

    /// First error messages, for reporting
    pub errors: Vec<String>,
}

impl ParseStats {
    /// Create empty statistics for a file
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    /// Record a skipped row
    pub fn record_error(&mut self, line: usize, message: impl std::fmt::Display) {
        self.rows_skipped += 1;
        if self.errors.len() < MAX_REPORTED_ERRORS {
            self.errors.push(format!("line {}: {}", line, message));
        }
    }

    /// Share of matched rows that produced a point, as a percentage
    pub fn emit_rate(&self) -> f64 {
        if self.matched_rows == 0 {
            0.0
        } else {
            (self.points_emitted as f64 / self.matched_rows as f64) * 100.0
        }
    }

    /// One-line summary for logging
    pub fn summary(&self) -> String {
        format!(
            "{}: {} rows, {} matched, {} points ({:.1}%), {} unchanged, {} placeholder only, {} skipped",
            self.file,
            self.total_rows,
            self.matched_rows,
            self.points_emitted,
            self.emit_rate(),
            self.unchanged_rows,
            self.placeholder_rows,
            self.rows_skipped
        )
    }
}
