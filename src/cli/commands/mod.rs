//! Command implementations for the EUC ingest CLI
//!
//! Each command lives in its own module:
//! - `ingest`: the full wipe-and-reload pipeline with a run report
//! - `metrics`: read back table counts and the stored summary metrics

pub mod ingest;
pub mod metrics;
pub mod shared;

use crate::cli::args::{Args, Commands};
use crate::{Error, Result};

/// Dispatch to the requested subcommand
pub async fn run(args: Args) -> Result<()> {
    match args.command {
        Some(Commands::Ingest(ingest_args)) => ingest::run_ingest(ingest_args).await.map(|_| ()),
        Some(Commands::Metrics(metrics_args)) => {
            metrics::run_metrics(metrics_args).await.map(|_| ())
        }
        None => Err(Error::configuration("No command given")),
    }
}
