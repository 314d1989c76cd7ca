//! Dashboard analytics snapshot
//!
//! Everything here is derived from the parsed rows and written as a JSON
//! document for the dashboard. None of it is persisted to storage.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use super::cliff::{CliffZone, RiskLevel, CLIFF_ZONES};
use super::summary::ProgramSummary;
use super::{mean, percent, round_to};
use crate::app::models::FplTier;
use crate::app::services::entity_resolver::ResolvedEntities;
use crate::app::services::record_loader::RowMapper;
use crate::app::services::tabular_reader::ParsedTable;
use crate::constants::{DEFAULT_CHILDREN_FOR_CLIFF, PROGRAM_INVESTMENT};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub generated_for: NaiveDate,
    pub summary: SnapshotSummary,
    pub outcomes: OutcomeMetrics,
    /// Participant count per FPL tier, every tier present
    pub fpl_distribution: BTreeMap<String, usize>,
    pub cliff_exposure: CliffExposure,
    pub county_metrics: BTreeMap<String, CountyMetrics>,
    pub navigator_performance: BTreeMap<String, NavigatorPerformance>,
    pub roi: RoiMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub total_participants: usize,
    pub with_wage_data: usize,
    pub with_fpl_data: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutcomeMetrics {
    pub graduated_count: usize,
    pub graduation_rate: f64,
    pub positive_wage_count: usize,
    pub positive_wage_rate: f64,
    pub avg_wage_change: f64,
    pub total_wage_gains: f64,
    pub positive_fpl_change_count: usize,
    pub positive_fpl_rate: f64,
    pub avg_fpl_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CliffExposure {
    pub summary: CliffSummary,
    pub zones: Vec<CliffZoneStats>,
}

/// Totals over the high and medium risk zones only
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CliffSummary {
    pub families_in_cliff_zone: usize,
    pub total_benefits_at_risk: f64,
    pub avg_exposure_per_family: f64,
    pub children_at_risk: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CliffZoneStats {
    pub id: &'static str,
    pub name: &'static str,
    pub range: &'static str,
    pub risk_level: RiskLevel,
    pub families: usize,
    pub children: i64,
    pub benefits_at_risk: f64,
    pub avg_exposure: f64,
    pub benefits_affected: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CountyMetrics {
    pub participants: usize,
    pub avg_wage_change: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NavigatorPerformance {
    pub caseload: usize,
    pub avg_fpl_change: Option<f64>,
    pub avg_wage_change: Option<f64>,
    /// Signed sum of wage changes across the caseload
    pub total_wage_change: f64,
}

/// Return on the program investment from measured wage gains
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiMetrics {
    pub measured_outcomes: MeasuredOutcomes,
    pub roi_tiers: RoiTiers,
    pub data_quality: DataQuality,
    pub investment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasuredOutcomes {
    /// Sum of positive wage changes only
    pub total_annual_wage_gains: f64,
    pub positive_gainers_count: usize,
    pub total_with_wage_data: usize,
    pub avg_gain_per_gainer: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiTiers {
    pub conservative: RoiTier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiTier {
    pub description: &'static str,
    pub roi: f64,
    /// Ratio as `"0.00:1"`
    pub roi_formatted: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataQuality {
    pub wage_data_pct: f64,
    pub positive_gainers_pct: f64,
}

/// Parsed figures for one row
struct RowFigures {
    county: Option<String>,
    navigator: Option<String>,
    children: Option<i64>,
    current_fpl: Option<f64>,
    fpl_change: Option<f64>,
    wage_change: Option<f64>,
}

#[derive(Default)]
struct Group {
    rows: usize,
    fpl_changes: Vec<f64>,
    wage_changes: Vec<f64>,
}

impl Group {
    fn add(&mut self, figures: &RowFigures) {
        self.rows += 1;
        self.fpl_changes.extend(figures.fpl_change);
        self.wage_changes.extend(figures.wage_change);
    }
}

impl DashboardSnapshot {
    /// Build the snapshot from the parsed export
    pub fn build(table: &ParsedTable, generated_for: NaiveDate) -> Result<Self> {
        let mapper = RowMapper::new(&table.columns)?;
        let no_entities = ResolvedEntities::default();

        let figures: Vec<RowFigures> = table
            .rows
            .iter()
            .map(|row| {
                let participant = mapper.participant(row, &no_entities);
                let outcome = mapper.outcome(row, "");
                RowFigures {
                    county: participant.county,
                    navigator: participant.navigator_name,
                    children: participant.children_in_household,
                    current_fpl: outcome.current_fpl,
                    fpl_change: outcome.fpl_change,
                    wage_change: outcome.wage_change,
                }
            })
            .collect();

        let program = ProgramSummary::from_table(table);

        Ok(Self {
            generated_for,
            summary: SnapshotSummary {
                total_participants: figures.len(),
                with_wage_data: figures.iter().filter(|f| f.wage_change.is_some()).count(),
                with_fpl_data: figures.iter().filter(|f| f.current_fpl.is_some()).count(),
            },
            outcomes: outcome_metrics(&figures, &program),
            fpl_distribution: fpl_distribution(&figures),
            cliff_exposure: cliff_exposure(&figures),
            county_metrics: county_metrics(&figures),
            navigator_performance: navigator_performance(&figures),
            roi: roi_metrics(&figures),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::serialization("Failed to serialize dashboard snapshot", e))
    }

    /// Write the snapshot as pretty JSON, creating parent directories
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::io(format!("Failed to create directory {}", parent.display()), e)
            })?;
        }

        std::fs::write(path, self.to_json()?)
            .map_err(|e| Error::io(format!("Failed to write snapshot {}", path.display()), e))?;

        info!("Wrote dashboard snapshot to {}", path.display());
        Ok(())
    }
}

fn outcome_metrics(figures: &[RowFigures], program: &ProgramSummary) -> OutcomeMetrics {
    let wages: Vec<f64> = figures.iter().filter_map(|f| f.wage_change).collect();
    let fpl_changes: Vec<f64> = figures.iter().filter_map(|f| f.fpl_change).collect();
    let positive_wage_count = wages.iter().filter(|w| **w > 0.0).count();
    let positive_fpl_change_count = fpl_changes.iter().filter(|c| **c > 0.0).count();

    OutcomeMetrics {
        graduated_count: program.graduated_count,
        graduation_rate: round_to(percent(program.graduated_count, program.total_families), 1),
        positive_wage_count,
        positive_wage_rate: round_to(percent(positive_wage_count, wages.len()), 1),
        avg_wage_change: round_to(mean(&wages).unwrap_or(0.0), 2),
        total_wage_gains: round_to(program.total_wage_gains, 2),
        positive_fpl_change_count,
        positive_fpl_rate: round_to(percent(positive_fpl_change_count, fpl_changes.len()), 1),
        avg_fpl_change: round_to(mean(&fpl_changes).unwrap_or(0.0), 1),
    }
}

/// Conservative ROI: measured positive wage gains over the investment
fn roi_metrics(figures: &[RowFigures]) -> RoiMetrics {
    let wages: Vec<f64> = figures.iter().filter_map(|f| f.wage_change).collect();
    let gains: Vec<f64> = wages.iter().copied().filter(|w| *w > 0.0).collect();
    let total_gains: f64 = gains.iter().sum();

    let roi = total_gains / PROGRAM_INVESTMENT;

    RoiMetrics {
        measured_outcomes: MeasuredOutcomes {
            total_annual_wage_gains: round_to(total_gains, 2),
            positive_gainers_count: gains.len(),
            total_with_wage_data: wages.len(),
            avg_gain_per_gainer: round_to(mean(&gains).unwrap_or(0.0), 2),
        },
        roi_tiers: RoiTiers {
            conservative: RoiTier {
                description: "Measured wage gains only",
                roi: round_to(roi, 4),
                roi_formatted: format!("{:.2}:1", roi),
            },
        },
        data_quality: DataQuality {
            wage_data_pct: round_to(percent(wages.len(), figures.len()), 1),
            positive_gainers_pct: round_to(percent(gains.len(), wages.len()), 1),
        },
        investment: PROGRAM_INVESTMENT,
    }
}

fn fpl_distribution(figures: &[RowFigures]) -> BTreeMap<String, usize> {
    let mut distribution: BTreeMap<String, usize> = FplTier::ALL
        .iter()
        .map(|tier| (tier.as_str().to_string(), 0))
        .collect();

    for f in figures {
        *distribution
            .entry(FplTier::classify(f.current_fpl).as_str().to_string())
            .or_default() += 1;
    }
    distribution
}

fn cliff_exposure(figures: &[RowFigures]) -> CliffExposure {
    let zones: Vec<CliffZoneStats> = CLIFF_ZONES
        .iter()
        .map(|zone| zone_stats(zone, figures))
        .collect();

    let mut summary = CliffSummary::default();
    for stats in zones.iter().filter(|z| z.risk_level.counts_toward_exposure()) {
        summary.families_in_cliff_zone += stats.families;
        summary.total_benefits_at_risk += stats.benefits_at_risk;
        summary.children_at_risk += stats.children;
    }
    if summary.families_in_cliff_zone > 0 {
        summary.avg_exposure_per_family =
            (summary.total_benefits_at_risk / summary.families_in_cliff_zone as f64).round();
    }

    CliffExposure { summary, zones }
}

fn zone_stats(zone: &CliffZone, figures: &[RowFigures]) -> CliffZoneStats {
    let mut families = 0;
    let mut children = 0;
    let mut benefits_at_risk = 0.0;

    for f in figures {
        let in_zone = f
            .current_fpl
            .and_then(CliffZone::for_fpl)
            .is_some_and(|found| found.id == zone.id);
        if !in_zone {
            continue;
        }
        let kids = f.children.unwrap_or(DEFAULT_CHILDREN_FOR_CLIFF);
        families += 1;
        children += kids;
        benefits_at_risk += zone.benefits_at_risk(kids);
    }

    let avg_exposure = if families > 0 {
        (benefits_at_risk / families as f64).round()
    } else {
        0.0
    };

    CliffZoneStats {
        id: zone.id,
        name: zone.name,
        range: zone.range,
        risk_level: zone.risk_level,
        families,
        children,
        benefits_at_risk,
        avg_exposure,
        benefits_affected: zone.benefits_affected.to_vec(),
    }
}

fn group_by<F>(figures: &[RowFigures], key: F) -> BTreeMap<String, Group>
where
    F: Fn(&RowFigures) -> Option<&String>,
{
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    for f in figures {
        if let Some(name) = key(f) {
            groups.entry(name.clone()).or_default().add(f);
        }
    }
    groups
}

fn county_metrics(figures: &[RowFigures]) -> BTreeMap<String, CountyMetrics> {
    group_by(figures, |f| f.county.as_ref())
        .into_iter()
        .map(|(name, group)| {
            let metrics = CountyMetrics {
                participants: group.rows,
                avg_wage_change: mean(&group.wage_changes).map(|v| round_to(v, 2)),
            };
            (name, metrics)
        })
        .collect()
}

fn navigator_performance(figures: &[RowFigures]) -> BTreeMap<String, NavigatorPerformance> {
    group_by(figures, |f| f.navigator.as_ref())
        .into_iter()
        .map(|(name, group)| {
            let performance = NavigatorPerformance {
                caseload: group.rows,
                avg_fpl_change: mean(&group.fpl_changes).map(|v| round_to(v, 2)),
                avg_wage_change: mean(&group.wage_changes).map(|v| round_to(v, 2)),
                total_wage_change: group.wage_changes.iter().sum(),
            };
            (name, performance)
        })
        .collect()
}
