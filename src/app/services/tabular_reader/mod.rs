//! Tabular reader for participant exports
//!
//! This module turns a delimited text export into a header mapping and an
//! ordered, immutable collection of data rows. Every later pipeline stage
//! borrows the same [`ParsedTable`].
//!
//! ## Architecture
//!
//! - [`reader`] - File loading and line splitting
//! - [`fields`] - Quote handling and trimming of split fragments
//! - [`column_mapping`] - Header name to column index lookup
//! - [`table`] - Parsed rows and named field access
//!
//! ## Usage
//!
//! ```rust
//! use euc_ingest::app::services::tabular_reader::TabularReader;
//!
//! let reader = TabularReader::default();
//! let table = reader
//!     .read_str("participant_id,emp_county\nP1,\"Putnam, TN\"\n", "inline")
//!     .unwrap();
//!
//! assert_eq!(table.row_count(), 1);
//! assert_eq!(table.rows[0].value(&table.columns, "emp_county"), Some("Putnam, TN"));
//! ```

pub mod column_mapping;
pub mod fields;
pub mod reader;
pub mod table;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use column_mapping::ColumnMapping;
pub use reader::TabularReader;
pub use table::{ParsedTable, SourceRow};
