//! Load statistics for the record loading loop

use serde::Serialize;

/// A row that could not be written to storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    /// 1-based position among data rows
    pub row_index: usize,
    /// Line in the source file
    pub line_number: u64,
    /// External participant key, when the row had one
    pub participant_id: Option<String>,
    /// Rejected by a uniqueness constraint, e.g. a repeated participant id
    pub duplicate: bool,
    pub message: String,
}

/// Statistics for one pass of the record loader
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Data rows seen
    pub total_rows: usize,
    /// Rows whose participant and outcome were both inserted
    pub loaded: usize,
    /// Rows recorded as failed
    pub errors: usize,
    /// Details for each failed row
    pub failures: Vec<RowFailure>,
}

impl LoadStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed row
    pub fn add_failure(&mut self, failure: RowFailure) {
        self.errors += 1;
        self.failures.push(failure);
    }

    /// Percentage of rows loaded; an empty export counts as fully loaded
    pub fn success_rate(&self) -> f64 {
        if self.total_rows == 0 {
            100.0
        } else {
            (self.loaded as f64 / self.total_rows as f64) * 100.0
        }
    }

    pub fn has_failures(&self) -> bool {
        self.errors > 0
    }

    /// Failed rows that repeated an existing unique key
    pub fn duplicate_count(&self) -> usize {
        self.failures.iter().filter(|f| f.duplicate).count()
    }

    /// One-line summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Loaded {} of {} rows ({:.1}% success) | Errors: {}",
            self.loaded,
            self.total_rows,
            self.success_rate(),
            self.errors
        )
    }
}
