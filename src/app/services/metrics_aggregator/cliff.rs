//! Benefit cliff zones
//!
//! A cliff zone is an FPL band in which a raise can cost a family more in lost
//! benefits than it gains in wages. Bands are half-open: `[fpl_low, fpl_high)`.

use serde::Serialize;

use crate::constants::benefits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// High and medium zones count toward exposure totals
    pub fn counts_toward_exposure(&self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Medium)
    }
}

/// Which benefits a family stands to lose inside a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BenefitRule {
    SnapAndTenncare,
    ChildcareAndLiheap,
    ChildcareAndSchoolLunch,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CliffZone {
    pub id: &'static str,
    pub name: &'static str,
    pub range: &'static str,
    pub fpl_low: f64,
    pub fpl_high: f64,
    pub risk_level: RiskLevel,
    pub benefits_affected: &'static [&'static str],
    rule: BenefitRule,
}

pub const CLIFF_ZONES: [CliffZone; 4] = [
    CliffZone {
        id: "snap_tenncare",
        name: "SNAP/TennCare Cliff",
        range: "100-130%",
        fpl_low: 100.0,
        fpl_high: 130.0,
        risk_level: RiskLevel::High,
        benefits_affected: &["SNAP (~$4,800/yr)", "TennCare adult (~$6,000/yr)"],
        rule: BenefitRule::SnapAndTenncare,
    },
    CliffZone {
        id: "liheap_childcare",
        name: "LIHEAP/Childcare Cliff",
        range: "130-150%",
        fpl_low: 130.0,
        fpl_high: 150.0,
        risk_level: RiskLevel::High,
        benefits_affected: &["Childcare subsidy (~$6K/child)", "LIHEAP (~$600/yr)"],
        rule: BenefitRule::ChildcareAndLiheap,
    },
    CliffZone {
        id: "deep_cliff",
        name: "Deep Cliff Zone",
        range: "150-185%",
        fpl_low: 150.0,
        fpl_high: 185.0,
        risk_level: RiskLevel::Medium,
        benefits_affected: &["Childcare loss imminent", "School lunch reduction"],
        rule: BenefitRule::ChildcareAndSchoolLunch,
    },
    CliffZone {
        id: "near_graduation",
        name: "Near Graduation",
        range: "185-225%",
        fpl_low: 185.0,
        fpl_high: 225.0,
        risk_level: RiskLevel::Low,
        benefits_affected: &["Minimal immediate risk", "Focus on graduation"],
        rule: BenefitRule::Nothing,
    },
];

impl CliffZone {
    /// The zone containing an FPL percentage, if any
    pub fn for_fpl(fpl_percent: f64) -> Option<&'static CliffZone> {
        CLIFF_ZONES
            .iter()
            .find(|zone| zone.fpl_low <= fpl_percent && fpl_percent < zone.fpl_high)
    }

    /// Estimated annual benefits at risk for a family with `children` children
    ///
    /// Per-child benefits assume at least one child.
    pub fn benefits_at_risk(&self, children: i64) -> f64 {
        let children = children.max(1) as f64;
        match self.rule {
            BenefitRule::SnapAndTenncare => benefits::SNAP_ANNUAL + benefits::TENNCARE_ADULT,
            BenefitRule::ChildcareAndLiheap => {
                benefits::CHILDCARE_PER_CHILD * children + benefits::LIHEAP_ANNUAL
            }
            BenefitRule::ChildcareAndSchoolLunch => {
                (benefits::CHILDCARE_PER_CHILD + benefits::SCHOOL_LUNCH_PER_CHILD) * children
            }
            BenefitRule::Nothing => 0.0,
        }
    }
}
