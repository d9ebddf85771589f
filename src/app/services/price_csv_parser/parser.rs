//! Change log file reader
//!
//! Drives one file through the pipeline: rows are read in file order, matched
//! against the station index, transformed and handed to the batch emitter.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::record_parser::{is_header_row, parse_raw_record, station_id};
use super::stats::ParseStats;
use crate::app::models::{Point, Station};
use crate::app::services::influx_writer::{BatchEmitter, PointSink};
use crate::app::services::record_transformer::RecordTransformer;
use crate::app::services::station_registry::StationIndex;
use crate::{Error, Result};

/// Reader for daily change log files
#[derive(Debug)]
pub struct PriceFileReader<'a> {
    index: &'a StationIndex,
    transformer: RecordTransformer,
    has_header: bool,
    show_progress: bool,
    cancellation_token: CancellationToken,
}

impl<'a> PriceFileReader<'a> {
    /// Create a reader matching rows against `index`
    pub fn new(index: &'a StationIndex, transformer: RecordTransformer) -> Self {
        Self {
            index,
            transformer,
            has_header: false,
            show_progress: false,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Skip the first row of every file
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Show a spinner while reading
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Stop reading once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Read a file and submit every resulting point to `emitter`
    ///
    /// Row-level errors are counted and logged; I/O and sink errors abort the
    /// file. The emitter is not flushed here.
    pub async fn ingest_file<S: PointSink>(
        &self,
        path: &Path,
        emitter: &mut BatchEmitter<S>,
    ) -> Result<ParseStats> {
        info!("Reading change log: {}", path.display());

        let file_label = path.display().to_string();
        let mut stats = ParseStats::new(&file_label);

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)
            .map_err(|e| {
                Error::csv_parsing(&file_label, "Failed to open change log", Some(e))
            })?;

        let progress = self.create_progress_bar(path);

        for (row, result) in reader.records().enumerate() {
            let line = row + 1;
            stats.total_rows += 1;

            if self.cancellation_token.is_cancelled() {
                return Err(Error::processing_interrupted(format!(
                    "stopped at line {} of {}",
                    line, file_label
                )));
            }

            if let Some(pb) = &progress {
                if line % 1000 == 0 {
                    pb.set_position(line as u64);
                }
            }

            if self.has_header && row == 0 {
                stats.header_rows += 1;
                continue;
            }

            let record = match result {
                Ok(record) => record,
                Err(e) if e.is_io_error() => {
                    return Err(Error::csv_parsing(&file_label, "Failed to read change log", Some(e)));
                }
                Err(e) => {
                    debug!("Skipped line {} of {}: {}", line, file_label, e);
                    stats.record_error(line, e);
                    continue;
                }
            };

            let Some(station) = self.matching_station(&record) else {
                if row == 0 && is_header_row(&record) {
                    warn!(
                        "First row of {} looks like a header; pass --has-header to skip it",
                        file_label
                    );
                }
                stats.unknown_station_rows += 1;
                continue;
            };
            stats.matched_rows += 1;

            match self.transform_record(&record, station) {
                Ok((Some(point), _)) => {
                    emitter.submit(point).await?;
                    stats.points_emitted += 1;
                }
                // Every changed price was a skipped negative placeholder
                Ok((None, true)) => stats.placeholder_rows += 1,
                Ok((None, false)) => stats.unchanged_rows += 1,
                Err(e) if e.is_row_level() => {
                    debug!("Skipped line {} of {}: {}", line, file_label, e);
                    stats.record_error(line, e);
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        if stats.rows_skipped > 0 {
            warn!(
                "Skipped {} malformed rows in {}",
                stats.rows_skipped, file_label
            );
        }
        info!("{}", stats.summary());

        Ok(stats)
    }

    fn matching_station(&self, record: &StringRecord) -> Option<&'a Station> {
        station_id(record).and_then(|id| self.index.lookup(id))
    }

    /// Point of a row, paired with whether the row reported any change
    fn transform_record(
        &self,
        record: &StringRecord,
        station: &Station,
    ) -> Result<(Option<Point>, bool)> {
        let raw = parse_raw_record(record)?;
        let point = self.transformer.transform(&raw, station)?;
        Ok((point, raw.has_changes()))
    }

    fn create_progress_bar(&self, path: &Path) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} rows {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(
            path.file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
        );
        Some(pb)
    }
}
