//! Program-wide summary metrics

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use super::{percent, round_to};
use crate::app::models::{EntityId, MetricRecord};
use crate::app::services::field_parsers::parse_number;
use crate::app::services::storage::ProgramStore;
use crate::app::services::tabular_reader::ParsedTable;
use crate::constants::{columns, metrics, OUTCOME_ACTIVE, OUTCOME_GRADUATED};
use crate::Result;

/// The five figures persisted after every run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProgramSummary {
    /// Every parsed data row, loaded or not
    pub total_families: usize,
    pub graduated_count: usize,
    pub active_count: usize,
    /// Sum of strictly positive wage changes
    pub total_wage_gains: f64,
    /// Graduated share of all rows in percent, two decimal places; 0 for an empty export
    pub graduation_rate: f64,
}

impl ProgramSummary {
    /// Aggregate over the parsed rows
    pub fn from_table(table: &ParsedTable) -> Self {
        let total_families = table.row_count();

        let count_category = |category: &str| {
            table
                .column_values(columns::OUTCOME_CATEGORY)
                .filter(|value| value.eq_ignore_ascii_case(category))
                .count()
        };
        let graduated_count = count_category(OUTCOME_GRADUATED);
        let active_count = count_category(OUTCOME_ACTIVE);

        let total_wage_gains = table
            .column_values(columns::WAGE_CHANGE)
            .filter_map(parse_number)
            .filter(|gain| *gain > 0.0)
            .sum();

        let graduation_rate = round_to(percent(graduated_count, total_families), 2);

        Self {
            total_families,
            graduated_count,
            active_count,
            total_wage_gains,
            graduation_rate,
        }
    }

    /// Metric rows in persistence order
    pub fn to_metric_records(&self, metric_date: NaiveDate) -> Vec<MetricRecord> {
        vec![
            MetricRecord::new(
                metrics::TOTAL_FAMILIES,
                self.total_families as f64,
                metric_date,
                metrics::NOTE_PROGRAM,
            ),
            MetricRecord::new(
                metrics::GRADUATED_COUNT,
                self.graduated_count as f64,
                metric_date,
                metrics::NOTE_OUTCOMES,
            ),
            MetricRecord::new(
                metrics::ACTIVE_COUNT,
                self.active_count as f64,
                metric_date,
                metrics::NOTE_OUTCOMES,
            ),
            MetricRecord::new(
                metrics::TOTAL_WAGE_GAINS,
                self.total_wage_gains,
                metric_date,
                metrics::NOTE_FINANCIAL,
            ),
            MetricRecord::new(
                metrics::GRADUATION_RATE,
                self.graduation_rate,
                metric_date,
                metrics::NOTE_OUTCOMES,
            ),
        ]
    }
}

/// Insert the summary's metric rows; any failure aborts the run
pub fn persist_summary(
    store: &dyn ProgramStore,
    summary: &ProgramSummary,
    metric_date: NaiveDate,
) -> Result<Vec<EntityId>> {
    let mut ids = Vec::new();
    for record in summary.to_metric_records(metric_date) {
        ids.push(store.insert_metric(&record)?);
    }

    info!(
        "Stored {} metrics: {} families, {} graduated, {} active, ${:.2} wage gains, {:.2}% graduation rate",
        ids.len(),
        summary.total_families,
        summary.graduated_count,
        summary.active_count,
        summary.total_wage_gains,
        summary.graduation_rate
    );
    Ok(ids)
}
