//! Parsed export rows and named field access

use super::column_mapping::ColumnMapping;

/// One data row from the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    /// 1-based line number in the source file
    pub line_number: u64,

    /// Trimmed field values in column order
    pub fields: Vec<String>,
}

impl SourceRow {
    pub fn new(line_number: u64, fields: Vec<String>) -> Self {
        Self {
            line_number,
            fields,
        }
    }

    /// Field value for a named column
    ///
    /// `None` when the header has no such column or this row is shorter than
    /// the header. Present-but-empty fields come back as `Some("")`.
    pub fn value<'a>(&'a self, columns: &ColumnMapping, name: &str) -> Option<&'a str> {
        columns
            .get_index(name)
            .and_then(|index| self.fields.get(index))
            .map(String::as_str)
    }

    /// Field value for a named column, with missing treated as empty
    pub fn text<'a>(&'a self, columns: &ColumnMapping, name: &str) -> &'a str {
        self.value(columns, name).unwrap_or("")
    }
}

/// Header mapping plus every data row, in source order
#[derive(Debug, Clone, Default)]
pub struct ParsedTable {
    pub columns: ColumnMapping,
    pub rows: Vec<SourceRow>,
}

impl ParsedTable {
    pub fn new(columns: ColumnMapping, rows: Vec<SourceRow>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate one column's values, missing cells yielding ""
    pub fn column_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rows.iter().map(move |row| row.text(&self.columns, name))
    }
}
