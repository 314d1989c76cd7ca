//! Record loading for participant exports
//!
//! This module walks the parsed rows once, in source order, and writes a
//! participant plus its linked outcome for each row. A failing row is logged,
//! counted and skipped; it never aborts the run.
//!
//! # Architecture
//!
//! - [`loader`] - `RecordLoader` and the per-row insert loop
//! - [`row_mapping`] - Building participant and outcome records from a row
//! - [`stats`] - Load statistics and per-row failures
//!
//! # Example Usage
//!
//! ```rust
//! use euc_ingest::app::services::entity_resolver::DistinctEntities;
//! use euc_ingest::app::services::record_loader::RecordLoader;
//! use euc_ingest::app::services::storage::SqliteStore;
//! use euc_ingest::app::services::tabular_reader::TabularReader;
//!
//! # fn example() -> euc_ingest::Result<()> {
//! let table = TabularReader::default()
//!     .read_str("participant_id,emp_navigator\nP1,Jane\n", "inline")?;
//! let store = SqliteStore::open_in_memory()?;
//! let resolved = DistinctEntities::scan(&table).insert_into(&store)?;
//!
//! let stats = RecordLoader::new(false).load(&store, &table, &resolved);
//! assert_eq!(stats.loaded, 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod loader;
pub mod row_mapping;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use loader::RecordLoader;
pub use row_mapping::RowMapper;
pub use stats::{LoadStats, RowFailure};
