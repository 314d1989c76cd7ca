//! Shared components for CLI commands

use crate::app::services::storage::{SqliteStore, StorageTarget};
use crate::{Error, Result};
use tracing::debug;

/// Set up structured logging on stderr
///
/// `RUST_LOG` takes precedence over the verbosity flags. A second call in the
/// same process keeps the first subscriber.
pub fn setup_logging(log_level: &str, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("euc_ingest={}", log_level)));

    let initialized = if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
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
    };

    match initialized {
        Ok(()) => debug!("Logging initialized at level: {}", log_level),
        Err(_) => debug!("Logging already initialized"),
    }
}

/// Errors that stop a run before any data is touched
pub fn is_critical_error(error: &Error) -> bool {
    matches!(
        error,
        Error::Configuration { .. } | Error::ProcessingInterrupted { .. }
    )
}

/// Line `main` prints for an error that ended the run
pub fn exit_message(error: &Error) -> String {
    if is_critical_error(error) {
        format!("Aborted: {:#}", error)
    } else {
        format!("Error: {:#}", error)
    }
}

/// Run blocking storage work off the async runtime, creating the database if needed
pub async fn with_store<T, F>(target: StorageTarget, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&SqliteStore) -> Result<T> + Send + 'static,
{
    run_blocking(target, SqliteStore::open_target, work).await
}

/// Like [`with_store`], but a database file must already exist
pub async fn with_existing_store<T, F>(target: StorageTarget, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&SqliteStore) -> Result<T> + Send + 'static,
{
    run_blocking(target, SqliteStore::open_existing_target, work).await
}

async fn run_blocking<T, F>(
    target: StorageTarget,
    open: fn(&StorageTarget) -> Result<SqliteStore>,
    work: F,
) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&SqliteStore) -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let store = open(&target)?;
        work(&store)
    })
    .await
    .map_err(|e| Error::processing_interrupted(format!("Storage task did not complete: {}", e)))?
}
