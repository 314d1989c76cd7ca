//! Tests for the tabular reader and column mapping

use super::{ParsedTable, TabularReader};


/// Parse inline export text with the default comma reader
pub fn parse(content: &str) -> ParsedTable {
    TabularReader::default()
        .read_str(content, "test.csv")
        .expect("inline export should parse")
}
