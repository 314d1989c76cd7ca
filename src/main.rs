use clap::Parser;
use euc_ingest::cli::commands::{self, shared::exit_message};
use euc_ingest::cli::args::Args;
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let shutdown_signal = async {
            // Without a handler there is nothing to wait for
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            result = commands::run(args) => result,
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, stopping...");
                Err(euc_ingest::Error::processing_interrupted(
                    "Ingest interrupted by user",
                ))
            }
        }
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("{}", exit_message(&error));
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("EUC Ingest - Participant Export Loader");
    println!("======================================");
    println!();
    println!("Load a participant export into the dashboard database, replacing its");
    println!("previous contents, and store the program summary metrics.");
    println!();
    println!("USAGE:");
    println!("    euc-ingest <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    ingest      Load a participant export (wipes and reloads all tables)");
    println!("    metrics     Show table counts and the stored summary metrics");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("ENVIRONMENT:");
    println!("    DATABASE_URL        Storage connection string (fallback: EUC_DATABASE_URL)");
    println!("    EUC_INPUT_FILE      Export to load when <FILE> is omitted");
    println!("    RUST_LOG            Log filter, overrides -v/-q");
    println!();
    println!("EXAMPLES:");
    println!("    # Load an export into a SQLite database:");
    println!("    euc-ingest ingest participants.csv --database sqlite://data/euc.db");
    println!();
    println!("    # Check an export without touching the database, writing the dashboard snapshot:");
    println!("    euc-ingest ingest participants.csv --dry-run --export dashboard.json");
    println!();
    println!("    # Show what is currently stored:");
    println!("    euc-ingest metrics --output-format json");
    println!();
    println!("For detailed help on any command, use:");
    println!("    euc-ingest <COMMAND> --help");
}
