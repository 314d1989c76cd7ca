//! Header name to column index mapping
//!
//! Lookups are exact: header text is case- and whitespace-sensitive after the
//! reader's trimming, so the export's header row is effectively part of the
//! contract with the pipeline.

use regex::Regex;
use std::collections::HashMap;

/// Column mapping built from the export header row
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    /// Column name to index mapping
    pub name_to_index: HashMap<String, usize>,

    /// Header names in source order
    pub headers: Vec<String>,
}

impl ColumnMapping {
    /// Build the mapping from the parsed header fields
    ///
    /// When a header name repeats, the first occurrence wins.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut name_to_index = HashMap::new();
        let mut names = Vec::with_capacity(headers.len());

        for (index, header) in headers.iter().enumerate() {
            let column_name = header.as_ref().to_string();
            name_to_index.entry(column_name.clone()).or_insert(index);
            names.push(column_name);
        }

        Self {
            name_to_index,
            headers: names,
        }
    }

    /// Get the index for a given column name
    pub fn get_index(&self, column_name: &str) -> Option<usize> {
        self.name_to_index.get(column_name).copied()
    }

    /// Check if a column exists in the mapping
    pub fn has_column(&self, column_name: &str) -> bool {
        self.name_to_index.contains_key(column_name)
    }

    /// First header (in source order) matching the pattern
    pub fn find_matching(&self, pattern: &Regex) -> Option<&str> {
        self.headers
            .iter()
            .map(String::as_str)
            .find(|header| pattern.is_match(header))
    }

    /// Number of columns in the header row
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Names from `expected` that are missing from the header row
    pub fn missing_columns<'a>(&self, expected: &[&'a str]) -> Vec<&'a str> {
        expected
            .iter()
            .copied()
            .filter(|name| !self.has_column(name))
            .collect()
    }
}
