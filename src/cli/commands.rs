//! Command implementation for the fuel price ingester CLI
//!
//! Wires configuration, station index, file reader and batch emitter together,
//! runs the files in order and reports the outcome.

use crate::app::services::influx_writer::{
    BatchEmitter, DiscardSink, EmitterStats, InfluxDbSink, PointSink,
};
use crate::app::services::price_csv_parser::{ParseStats, PriceFileReader};
use crate::app::services::record_transformer::RecordTransformer;
use crate::cli::args::{Args, OutputFormat};
use crate::config::Config;
use crate::{Error, Result};
use indicatif::HumanDuration;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Statistics of a complete run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Number of configured stations
    pub stations_configured: usize,
    /// Number of files read completely
    pub files_processed: usize,
    /// Rows read across all files
    pub total_rows: usize,
    /// Rows for configured stations
    pub matched_rows: usize,
    /// Points handed to the emitter
    pub points_emitted: usize,
    /// Matched rows without any change
    pub unchanged_rows: usize,
    /// Matched rows whose only changes were negative placeholder prices
    pub placeholder_rows: usize,
    /// Rows skipped because of row-level errors
    pub rows_skipped: usize,
    /// Delivery counters of the emitter
    pub emitter: EmitterStats,
    /// Total processing time
    pub processing_time: Duration,
    /// Per-file statistics
    pub files: Vec<ParseStats>,
}

impl RunStats {
    /// Add the statistics of one file
    pub fn add_file(&mut self, file: ParseStats) {
        self.files_processed += 1;
        self.total_rows += file.total_rows;
        self.matched_rows += file.matched_rows;
        self.points_emitted += file.points_emitted;
        self.unchanged_rows += file.unchanged_rows;
        self.placeholder_rows += file.placeholder_rows;
        self.rows_skipped += file.rows_skipped;
        self.files.push(file);
    }
}

/// Main command runner
///
/// 1. Set up logging and validate arguments
/// 2. Load configuration and build the station index
/// 3. Ingest all files, flushing after every file and once at the end
/// 4. Print the final report
pub async fn run(args: Args, cancellation_token: CancellationToken) -> Result<RunStats> {
    setup_logging(&args)?;

    info!("Starting fuel price ingest");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let config = Config::load(args.config_file.as_deref())?;
    let index = config.station_index()?;
    info!("Tracking {} stations", index.len());

    let reader = PriceFileReader::new(&index, RecordTransformer::from_config(&config))
        .with_header(args.has_header)
        .with_progress(args.show_progress())
        .with_cancellation(cancellation_token.clone());

    let batch_size = config.ingest.batch_size;
    let retry = config.ingest.retry_policy();

    let mut stats = if args.dry_run {
        info!("Dry run: points will not be written");
        let emitter = BatchEmitter::new(DiscardSink::default(), batch_size, retry)
            .with_cancellation(cancellation_token);
        ingest_files(&reader, &args.files, emitter).await?
    } else {
        let sink = InfluxDbSink::new(&config.influx_db, config.ingest.request_timeout())?;
        info!("Writing to {}", sink.write_url());
        let emitter =
            BatchEmitter::new(sink, batch_size, retry).with_cancellation(cancellation_token);
        ingest_files(&reader, &args.files, emitter).await?
    };
    stats.stations_configured = index.len();

    generate_final_report(&args, &stats)?;
    Ok(stats)
}

/// Ingest `files` in order through `emitter`
///
/// The emitter is flushed after every file and finished on every exit path,
/// so points submitted before a fatal error are still written. The first
/// error is returned; a failing final flush after it is only logged.
pub async fn ingest_files<S: PointSink>(
    reader: &PriceFileReader<'_>,
    files: &[PathBuf],
    mut emitter: BatchEmitter<S>,
) -> Result<RunStats> {
    let start_time = Instant::now();
    let mut stats = RunStats::default();

    let outcome = ingest_in_order(reader, files, &mut emitter, &mut stats).await;
    let finished = emitter.finish().await;
    stats.processing_time = start_time.elapsed();

    match (outcome, finished) {
        (Ok(()), Ok(emitter_stats)) => {
            stats.emitter = emitter_stats;
            info!(
                "Ingested {} files: {} points written in {} batches",
                stats.files_processed,
                emitter_stats.points_written,
                emitter_stats.batches_written
            );
            Ok(stats)
        }
        (Err(e), Ok(emitter_stats)) => {
            error!(
                "Stopped after {} files; {} points were written before the error",
                stats.files_processed, emitter_stats.points_written
            );
            Err(e)
        }
        (Ok(()), Err(flush_error)) => Err(flush_error),
        (Err(e), Err(flush_error)) => {
            error!("Final flush failed as well: {}", flush_error);
            Err(e)
        }
    }
}

async fn ingest_in_order<S: PointSink>(
    reader: &PriceFileReader<'_>,
    files: &[PathBuf],
    emitter: &mut BatchEmitter<S>,
    stats: &mut RunStats,
) -> Result<()> {
    for file in files {
        let file_stats = reader.ingest_file(file, emitter).await?;
        emitter.flush().await?;
        stats.add_file(file_stats);
    }
    Ok(())
}

/// Set up structured logging
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fuelprice_ingest={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| Error::configuration(format!("Failed to initialise logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Generate final report
fn generate_final_report(args: &Args, stats: &RunStats) -> Result<()> {
    match args.output_format {
        OutputFormat::Human if !args.quiet => generate_human_report(stats, args.dry_run),
        OutputFormat::Human => Ok(()),
        OutputFormat::Json => generate_json_report(stats, args.dry_run),
    }
}

/// Generate human-readable report
fn generate_human_report(stats: &RunStats, dry_run: bool) -> Result<()> {
    println!();
    if dry_run {
        println!("Fuel price ingest complete (dry run, nothing written)");
    } else {
        println!("Fuel price ingest complete");
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   • Stations configured: {}", stats.stations_configured);
    println!("   • Files processed: {}", stats.files_processed);
    println!("   • Rows read: {}", stats.total_rows);
    println!("   • Rows for configured stations: {}", stats.matched_rows);
    println!("   • Rows without changes: {}", stats.unchanged_rows);
    if stats.placeholder_rows > 0 {
        println!(
            "   • Rows with only placeholder prices: {}",
            stats.placeholder_rows
        );
    }
    println!("   • Points emitted: {}", stats.points_emitted);
    println!(
        "   • Points written: {} in {} batches",
        stats.emitter.points_written, stats.emitter.batches_written
    );
    if stats.emitter.retries > 0 {
        println!("   • Write retries: {}", stats.emitter.retries);
    }
    println!("   • Processing time: {}", HumanDuration(stats.processing_time));

    if stats.rows_skipped > 0 {
        println!("\nRows skipped: {}", stats.rows_skipped);
        for file in stats.files.iter().filter(|f| f.rows_skipped > 0) {
            println!("   {} ({} rows)", file.file, file.rows_skipped);
            for message in &file.errors {
                println!("     - {}", message);
            }
        }
    }

    println!();
    Ok(())
}

/// Generate JSON report for machine consumption
fn generate_json_report(stats: &RunStats, dry_run: bool) -> Result<()> {
    let json_stats = serde_json::json!({
        "dry_run": dry_run,
        "stations_configured": stats.stations_configured,
        "files_processed": stats.files_processed,
        "total_rows": stats.total_rows,
        "matched_rows": stats.matched_rows,
        "unchanged_rows": stats.unchanged_rows,
        "placeholder_rows": stats.placeholder_rows,
        "points_emitted": stats.points_emitted,
        "rows_skipped": stats.rows_skipped,
        "points_written": stats.emitter.points_written,
        "batches_written": stats.emitter.batches_written,
        "write_retries": stats.emitter.retries,
        "processing_time_seconds": stats.processing_time.as_secs_f64(),
        "files": stats.files,
    });

    let rendered = serde_json::to_string_pretty(&json_stats)
        .map_err(|e| Error::io("Failed to render JSON report", std::io::Error::other(e)))?;
    println!("{}", rendered);
    Ok(())
}
