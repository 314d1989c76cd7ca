//! Delimited export reader
//!
//! The `csv` crate splits the text into physical lines and delimiter-separated
//! fragments with quoting turned off. [`assemble_fields`] then applies the
//! quote rule, so a quoted section may start anywhere in a field and may hold
//! the delimiter. No implicit header handling; ragged rows are allowed.

use std::path::Path;
use tracing::{debug, info, warn};

use super::column_mapping::ColumnMapping;
use super::fields::assemble_fields;
use super::table::{ParsedTable, SourceRow};
use crate::constants::DEFAULT_DELIMITER;
use crate::{Error, Result};

/// Reader for delimited participant exports
#[derive(Debug, Clone, Copy)]
pub struct TabularReader {
    delimiter: u8,
}

impl Default for TabularReader {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl TabularReader {
    /// Create a reader for the given single-byte delimiter
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Read and parse an export file
    pub async fn read_file(&self, file_path: &Path) -> Result<ParsedTable> {
        info!("Reading participant export: {}", file_path.display());

        if !file_path.exists() {
            return Err(Error::file_not_found(file_path.display().to_string()));
        }

        let content = tokio::fs::read_to_string(file_path).await.map_err(|e| {
            Error::io(format!("Failed to read file {}", file_path.display()), e)
        })?;

        self.read_str(&content, &file_path.display().to_string())
    }

    /// Parse export text; `source_name` labels errors and warnings
    pub fn read_str(&self, content: &str, source_name: &str) -> Result<ParsedTable> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(content.as_bytes());

        let mut columns: Option<ColumnMapping> = None;
        let mut rows = Vec::new();

        for result in csv_reader.records() {
            let record = result.map_err(|e| {
                let message = match e.position() {
                    Some(pos) => format!("Unreadable record at line {}", pos.line()),
                    None => "Unreadable record".to_string(),
                };
                Error::csv_parsing(source_name, message, Some(e))
            })?;

            let line_number = record.position().map(|p| p.line()).unwrap_or_default();
            let line = assemble_fields(record.iter(), self.delimiter as char);

            // Whitespace-only lines trim down to a single empty field
            if line.fields.iter().all(|field| field.is_empty()) {
                continue;
            }

            if line.unterminated_quote {
                warn!(
                    "Line {} of '{}' ends inside a quoted field",
                    line_number, source_name
                );
            }
            let fields = line.fields;

            match &columns {
                None => {
                    debug!("Header row at line {}: {} columns", line_number, fields.len());
                    columns = Some(ColumnMapping::from_headers(&fields));
                }
                Some(mapping) => {
                    if fields.len() < mapping.column_count() {
                        debug!(
                            "Line {} has {} of {} fields",
                            line_number,
                            fields.len(),
                            mapping.column_count()
                        );
                    }
                    rows.push(SourceRow::new(line_number, fields));
                }
            }
        }

        let columns = columns.ok_or_else(|| {
            Error::data_validation(format!("No header row found in '{}'", source_name))
        })?;

        if rows.is_empty() {
            warn!("Export '{}' has a header but no data rows", source_name);
        }

        info!(
            "Parsed {} data rows across {} columns",
            rows.len(),
            columns.column_count()
        );

        Ok(ParsedTable::new(columns, rows))
    }
}
