//! Ingest command implementation
//!
//! Loads configuration, reads the export, then runs the remaining pipeline
//! steps on a blocking thread against the configured store (or a scratch
//! in-memory store for dry runs) and prints the run report.

use super::shared::{setup_logging, with_store};
use crate::app::services::pipeline::{IngestPipeline, IngestReport, PipelineOptions};
use crate::app::services::storage::StorageTarget;
use crate::cli::args::{IngestArgs, OutputFormat};
use crate::config::Config;
use crate::Result;
use colored::Colorize;
use std::time::Instant;
use tracing::{debug, info};

/// Failed rows listed individually in the human report
const MAX_LISTED_FAILURES: usize = 10;

pub async fn run_ingest(args: IngestArgs) -> Result<IngestReport> {
    let start_time = Instant::now();
    setup_logging(args.get_log_level(), args.quiet);

    info!("Starting EUC ingest");
    debug!("Command line arguments: {:?}", args);

    let config = Config::load(&args.config_overrides())?;
    let report = ingest_with_config(&config, args.show_progress()).await?;

    info!("Ingest finished in {:.2}s", start_time.elapsed().as_secs_f64());
    print_report(&report, args.output_format)?;
    Ok(report)
}

/// Run the pipeline for an already loaded configuration
pub async fn ingest_with_config(config: &Config, show_progress: bool) -> Result<IngestReport> {
    let input = config.input_file()?;

    let target = if config.ingest.dry_run {
        info!("Dry run: loading into a scratch in-memory store");
        StorageTarget::Memory
    } else {
        config.storage_target()?
    };

    let pipeline = IngestPipeline::new(PipelineOptions {
        delimiter: config.delimiter_byte(),
        metric_date: config.metric_date(),
        show_progress,
        dry_run: config.ingest.dry_run,
        export_path: config.ingest.export_path.clone(),
    });

    let table = pipeline.read(&input).await?;
    let source = input.display().to_string();

    with_store(target, move |store| pipeline.load(store, &table, &source)).await
}

fn print_report(report: &IngestReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            print_human_report(report);
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
            Ok(())
        }
    }
}

fn print_human_report(report: &IngestReport) {
    let title = if report.dry_run {
        "EUC Ingest Dry Run Complete"
    } else {
        "EUC Ingest Complete"
    };
    println!("\n{}", title.green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Source: {}", report.source);
    println!("   • Rows found: {}", report.rows_found);
    if !report.missing_columns.is_empty() {
        println!(
            "{}",
            format!(
                "   • Missing columns (loaded as null): {}",
                report.missing_columns.join(", ")
            )
            .yellow()
        );
    }
    println!("   • Counties inserted: {}", report.counties_inserted);
    println!("   • Navigators inserted: {}", report.navigators_inserted);
    println!(
        "   • Rows loaded: {} of {} ({:.1}% success)",
        report.load.loaded,
        report.load.total_rows,
        report.load.success_rate()
    );

    if report.load.has_failures() {
        println!(
            "{}",
            format!(
                "   • Rows failed: {} ({} duplicates)",
                report.load.errors,
                report.load.duplicate_count()
            )
            .yellow()
        );
        for failure in report.load.failures.iter().take(MAX_LISTED_FAILURES) {
            let kind = if failure.duplicate { "duplicate" } else { "error" };
            println!(
                "       line {} ({}, {}): {}",
                failure.line_number,
                failure.participant_id.as_deref().unwrap_or("no participant id"),
                kind,
                failure.message
            );
        }
        if report.load.failures.len() > MAX_LISTED_FAILURES {
            println!(
                "       ... and {} more",
                report.load.failures.len() - MAX_LISTED_FAILURES
            );
        }
    }

    let summary = &report.summary;
    println!("\n{} ({})", "Summary Metrics".bold(), report.metric_date);
    println!("   • Total families: {}", summary.total_families);
    println!("   • Graduated: {}", summary.graduated_count);
    println!("   • Active: {}", summary.active_count);
    println!("   • Total wage gains: ${:.2}", summary.total_wage_gains);
    println!("   • Graduation rate: {:.2}%", summary.graduation_rate);

    if let Some(path) = &report.snapshot_path {
        println!("\nDashboard snapshot: {}", path.display());
    }
    println!();
}
