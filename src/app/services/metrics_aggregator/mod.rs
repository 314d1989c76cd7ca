//! Metrics aggregation over the parsed export
//!
//! Aggregates are computed from the original parsed row set, not from what
//! reached storage, so rows that failed to load still count.
//!
//! - [`summary`] - The five program-wide figures persisted as metric rows
//! - [`snapshot`] - The wider dashboard analytics snapshot exported as JSON
//! - [`cliff`] - Benefit cliff zones and exposure estimates

pub mod cliff;
pub mod snapshot;
pub mod summary;

#[cfg(test)]
pub mod tests;

pub use cliff::{CliffZone, RiskLevel, CLIFF_ZONES};
pub use snapshot::DashboardSnapshot;
pub use summary::{persist_summary, ProgramSummary};

/// Round to a fixed number of decimal places
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Percentage of `part` in `whole`, zero when `whole` is zero
pub(crate) fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Arithmetic mean, `None` for an empty slice
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
