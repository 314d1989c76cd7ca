//! Metrics command implementation

use super::shared::{setup_logging, with_existing_store};
use crate::app::models::{Metric, TableCounts};
use crate::app::services::storage::{ProgramStore, TABLES};
use crate::cli::args::{MetricsArgs, OutputFormat};
use crate::config::Config;
use crate::Result;
use colored::Colorize;
use serde::Serialize;
use tracing::info;

/// What the dashboard database currently holds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsListing {
    pub table_counts: TableCounts,
    pub metrics: Vec<Metric>,
}

pub async fn run_metrics(args: MetricsArgs) -> Result<MetricsListing> {
    setup_logging(args.get_log_level(), false);

    let config = Config::load(&args.config_overrides())?;
    let listing = read_listing(&config).await?;
    info!(
        "Read {} metrics from {} tables",
        listing.metrics.len(),
        TABLES.len()
    );

    match args.output_format {
        OutputFormat::Human => print_human_listing(&listing),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
    }
    Ok(listing)
}

/// Read counts and metrics from an existing database; never creates one
pub async fn read_listing(config: &Config) -> Result<MetricsListing> {
    let target = config.storage_target()?;
    with_existing_store(target, |store| {
        Ok(MetricsListing {
            table_counts: store.table_counts()?,
            metrics: store.list_metrics()?,
        })
    })
    .await
}

fn print_human_listing(listing: &MetricsListing) {
    let counts = &listing.table_counts;
    println!("\n{}", "Dashboard Tables".bold());
    println!("   • counties: {}", counts.counties);
    println!("   • navigators: {}", counts.navigators);
    println!("   • participants: {}", counts.participants);
    println!("   • outcomes: {}", counts.outcomes);
    println!("   • metrics: {}", counts.metrics);

    if listing.metrics.is_empty() {
        println!("\n{}", "No metrics stored yet".yellow());
        return;
    }

    println!("\n{}", "Stored Metrics".bold());
    for metric in &listing.metrics {
        let record = &metric.record;
        println!(
            "   • {:<18} {:>12.2}  {}  [{}]",
            record.metric_name,
            record.metric_value,
            record.metric_date,
            record.notes.as_deref().unwrap_or("")
        );
    }
    println!();
}
