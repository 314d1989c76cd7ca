//! Data models for EUC ingestion
//!
//! This module contains the storage entities written by the pipeline (counties,
//! navigators, participants, outcomes and metrics) together with the insert
//! forms the loader builds from export rows.

use crate::constants::fpl;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generated surrogate identifier for a stored entity
pub type EntityId = String;

// =============================================================================
// Reference Entities
// =============================================================================

/// A county referenced by at least one participant
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct County {
    pub id: EntityId,
    /// Business key, unique across counties
    pub name: String,
}

/// A program navigator assigned to participant families
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Navigator {
    pub id: EntityId,
    /// Business key, unique across navigators
    pub name: String,
}

// =============================================================================
// Participant and Outcome
// =============================================================================

/// Participant fields as built from one export row, before storage assigns an id
///
/// `county` is a display string kept alongside the County entity rather than a
/// foreign key; dashboard queries read the flat string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ParticipantRecord {
    /// External natural key from the export (`participant_id`)
    pub participant_id: Option<String>,
    pub county: Option<String>,
    pub enrollment_status: Option<String>,
    pub enrollment_date: Option<NaiveDateTime>,
    /// Reference to the resolved Navigator, null when the row names none
    pub navigator_id: Option<EntityId>,
    /// Denormalized navigator name, never set from an empty source value
    pub navigator_name: Option<String>,
    pub household_size: Option<i64>,
    pub children_in_household: Option<i64>,
    pub employed_at_enrollment: Option<bool>,
}

/// A stored participant
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Participant {
    pub id: EntityId,
    #[serde(flatten)]
    pub record: ParticipantRecord,
}

/// Outcome snapshot fields for one participant, before storage assigns an id
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OutcomeRecord {
    /// Generated id of the participant inserted immediately before
    pub participant_id: EntityId,
    pub fpl_at_enrollment: Option<f64>,
    pub current_fpl: Option<f64>,
    pub fpl_change: Option<f64>,
    pub wage_change: Option<f64>,
    pub days_in_program: Option<i64>,
    pub outcome_category: Option<String>,
}

/// A stored outcome
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Outcome {
    pub id: EntityId,
    #[serde(flatten)]
    pub record: OutcomeRecord,
}

// =============================================================================
// Metrics
// =============================================================================

/// A named summary figure, before storage assigns an id
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MetricRecord {
    pub metric_name: String,
    pub metric_value: f64,
    pub metric_date: NaiveDate,
    pub notes: Option<String>,
}

impl MetricRecord {
    /// Create a metric with a classification note
    pub fn new(
        metric_name: impl Into<String>,
        metric_value: f64,
        metric_date: NaiveDate,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            metric_name: metric_name.into(),
            metric_value,
            metric_date,
            notes: Some(notes.into()),
        }
    }
}

/// A stored metric
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Metric {
    pub id: EntityId,
    #[serde(flatten)]
    pub record: MetricRecord,
}

/// Row counts for every table written by the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TableCounts {
    pub counties: usize,
    pub navigators: usize,
    pub participants: usize,
    pub outcomes: usize,
    pub metrics: usize,
}

// =============================================================================
// FPL Tiers
// =============================================================================

/// Position of a household's income relative to the federal poverty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FplTier {
    Graduated,
    NearGraduation,
    WorkingProgress,
    SnapCliff,
    PovertyLine,
    DeepPoverty,
    ExtremePoverty,
    Unknown,
}

impl FplTier {
    /// All tiers from highest to lowest, `Unknown` last
    pub const ALL: [FplTier; 8] = [
        FplTier::Graduated,
        FplTier::NearGraduation,
        FplTier::WorkingProgress,
        FplTier::SnapCliff,
        FplTier::PovertyLine,
        FplTier::DeepPoverty,
        FplTier::ExtremePoverty,
        FplTier::Unknown,
    ];

    /// Classify an FPL percentage; null maps to `Unknown`
    pub fn classify(fpl_percent: Option<f64>) -> Self {
        match fpl_percent {
            None => FplTier::Unknown,
            Some(v) if v >= fpl::GRADUATION => FplTier::Graduated,
            Some(v) if v >= fpl::SCHOOL_MEALS_CLIFF => FplTier::NearGraduation,
            Some(v) if v >= fpl::LIHEAP_CLIFF => FplTier::WorkingProgress,
            Some(v) if v >= fpl::SNAP_CLIFF => FplTier::SnapCliff,
            Some(v) if v >= fpl::POVERTY => FplTier::PovertyLine,
            Some(v) if v >= fpl::DEEP_POVERTY => FplTier::DeepPoverty,
            Some(_) => FplTier::ExtremePoverty,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FplTier::Graduated => "graduated",
            FplTier::NearGraduation => "near_graduation",
            FplTier::WorkingProgress => "working_progress",
            FplTier::SnapCliff => "snap_cliff",
            FplTier::PovertyLine => "poverty_line",
            FplTier::DeepPoverty => "deep_poverty",
            FplTier::ExtremePoverty => "extreme_poverty",
            FplTier::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FplTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
