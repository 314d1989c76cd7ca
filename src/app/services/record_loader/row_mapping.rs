//! Mapping export rows onto participant and outcome records
//!
//! Column positions are fixed per export, so [`RowMapper`] resolves the
//! free-text question columns once and then maps every row with the field
//! parsers.

use regex::Regex;
use tracing::debug;

use crate::app::models::{OutcomeRecord, ParticipantRecord};
use crate::app::services::entity_resolver::ResolvedEntities;
use crate::app::services::field_parsers::{
    parse_bool, parse_date, parse_number, parse_rounded, parse_text,
};
use crate::app::services::tabular_reader::{ColumnMapping, SourceRow};
use crate::constants::{columns, question_patterns};
use crate::{Error, Result};

/// Row to record mapping for one export's header
#[derive(Debug, Clone)]
pub struct RowMapper {
    columns: ColumnMapping,
    children_column: Option<String>,
    employed_column: Option<String>,
}

impl RowMapper {
    /// Prepare a mapper, locating the survey question columns in the header
    pub fn new(columns: &ColumnMapping) -> Result<Self> {
        let children = compile(question_patterns::CHILDREN_IN_HOUSEHOLD)?;
        let employed = compile(question_patterns::EMPLOYED_AT_ENROLLMENT)?;

        let children_column = columns.find_matching(&children).map(str::to_string);
        let employed_column = columns.find_matching(&employed).map(str::to_string);
        debug!(
            "Question columns: children={:?} employed={:?}",
            children_column, employed_column
        );

        Ok(Self {
            columns: columns.clone(),
            children_column,
            employed_column,
        })
    }

    pub fn children_column(&self) -> Option<&str> {
        self.children_column.as_deref()
    }

    pub fn employed_column(&self) -> Option<&str> {
        self.employed_column.as_deref()
    }

    fn text<'a>(&self, row: &'a SourceRow, name: &str) -> &'a str {
        row.text(&self.columns, name)
    }

    fn question<'a>(&self, row: &'a SourceRow, column: &Option<String>) -> &'a str {
        column
            .as_deref()
            .map(|name| row.text(&self.columns, name))
            .unwrap_or("")
    }

    /// External participant key for a row, when present
    pub fn participant_key(&self, row: &SourceRow) -> Option<String> {
        parse_text(self.text(row, columns::PARTICIPANT_ID))
    }

    /// Build the participant record, resolving the navigator reference
    pub fn participant(&self, row: &SourceRow, resolved: &ResolvedEntities) -> ParticipantRecord {
        let navigator_name = parse_text(self.text(row, columns::NAVIGATOR));
        let navigator_id = navigator_name
            .as_deref()
            .and_then(|name| resolved.navigator_id(name))
            .cloned();

        ParticipantRecord {
            participant_id: self.participant_key(row),
            county: parse_text(self.text(row, columns::COUNTY)),
            enrollment_status: parse_text(self.text(row, columns::ENROLLMENT_STATUS)),
            enrollment_date: parse_date(self.text(row, columns::ENROLLMENT_DATE)),
            navigator_id,
            navigator_name,
            household_size: parse_rounded(self.text(row, columns::HOUSEHOLD_SIZE)),
            children_in_household: parse_rounded(self.question(row, &self.children_column)),
            employed_at_enrollment: parse_bool(self.question(row, &self.employed_column)),
        }
    }

    /// Build the outcome record linked to a stored participant id
    pub fn outcome(&self, row: &SourceRow, participant_entity_id: &str) -> OutcomeRecord {
        OutcomeRecord {
            participant_id: participant_entity_id.to_string(),
            fpl_at_enrollment: parse_number(self.text(row, columns::FPL_AT_ENROLLMENT)),
            current_fpl: parse_number(self.text(row, columns::CURRENT_FPL)),
            fpl_change: parse_number(self.text(row, columns::FPL_CHANGE)),
            wage_change: parse_number(self.text(row, columns::WAGE_CHANGE)),
            days_in_program: parse_rounded(self.text(row, columns::DAYS_IN_PROGRAM)),
            outcome_category: parse_text(self.text(row, columns::OUTCOME_CATEGORY)),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::configuration(format!("Invalid column pattern '{}': {}", pattern, e)))
}
