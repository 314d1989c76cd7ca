//! Shared fixtures for record loader tests

use crate::app::services::entity_resolver::{DistinctEntities, ResolvedEntities};
use crate::app::services::storage::SqliteStore;
use crate::app::services::tabular_reader::{ParsedTable, TabularReader};


/// Header covering every column the loader reads
pub const FULL_HEADER: &str = "participant_id,emp_county,emp_navigator,Enrollment Status,\
emp_enrollment_date,emp_household_size_at_enrollment,\
\"How many children live in your household?\",Are you currently employed?,\
emp_fpl_at_enrollment,emp_current_fpl,emp_fpl_change,\
emp_wage_increases_since_enrollment,emp_days_in_program,outcome_category";

pub fn parse(content: &str) -> ParsedTable {
    TabularReader::default()
        .read_str(content, "test.csv")
        .expect("fixture should parse")
}

/// Fresh in-memory store with the export's counties and navigators resolved
pub fn resolved_store(table: &ParsedTable) -> (SqliteStore, ResolvedEntities) {
    let store = SqliteStore::open_in_memory().unwrap();
    let resolved = DistinctEntities::scan(table).insert_into(&store).unwrap();
    (store, resolved)
}
