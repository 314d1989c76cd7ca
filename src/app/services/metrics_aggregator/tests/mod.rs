//! Shared fixtures for metrics aggregation tests

use crate::app::services::tabular_reader::{ParsedTable, TabularReader};
use chrono::NaiveDate;


pub fn parse(content: &str) -> ParsedTable {
    TabularReader::default()
        .read_str(content, "test.csv")
        .expect("fixture should parse")
}

pub fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

/// Five households spread over every cliff zone plus one with no FPL data
pub fn dashboard_table() -> ParsedTable {
    parse(
        "participant_id,emp_county,emp_navigator,\"How many children live in your household?\",\
emp_current_fpl,emp_fpl_change,emp_wage_increases_since_enrollment,outcome_category\n\
         P1,Putnam,Jane,2,120,20,5000,graduated\n\
         P2,Putnam,Jane,,140,-5,-200,active\n\
         P3,Overton,Marcus,3,160,10,3000,graduated\n\
         P4,Overton,,0,200,,,dismissed\n\
         P5,,Marcus,,,,,active\n",
    )
}
