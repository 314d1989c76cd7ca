//! Application constants for EUC ingest
//!
//! This module contains the export header names, metric names, FPL thresholds,
//! benefit values and environment variable names used throughout the crate.

// =============================================================================
// Export Header Names
// =============================================================================

/// Column names in the participant export, matched exactly
pub mod columns {
    pub const PARTICIPANT_ID: &str = "participant_id";
    pub const COUNTY: &str = "emp_county";
    pub const NAVIGATOR: &str = "emp_navigator";
    pub const ENROLLMENT_STATUS: &str = "Enrollment Status";
    pub const ENROLLMENT_DATE: &str = "emp_enrollment_date";
    pub const HOUSEHOLD_SIZE: &str = "emp_household_size_at_enrollment";
    pub const FPL_AT_ENROLLMENT: &str = "emp_fpl_at_enrollment";
    pub const CURRENT_FPL: &str = "emp_current_fpl";
    pub const FPL_CHANGE: &str = "emp_fpl_change";
    pub const WAGE_CHANGE: &str = "emp_wage_increases_since_enrollment";
    pub const DAYS_IN_PROGRAM: &str = "emp_days_in_program";
    pub const OUTCOME_CATEGORY: &str = "outcome_category";

    /// Every exactly-named column the loader reads
    pub const EXPECTED: &[&str] = &[
        PARTICIPANT_ID,
        COUNTY,
        NAVIGATOR,
        ENROLLMENT_STATUS,
        ENROLLMENT_DATE,
        HOUSEHOLD_SIZE,
        FPL_AT_ENROLLMENT,
        CURRENT_FPL,
        FPL_CHANGE,
        WAGE_CHANGE,
        DAYS_IN_PROGRAM,
        OUTCOME_CATEGORY,
    ];
}

/// Free-text survey questions located by pattern rather than exact name
pub mod question_patterns {
    /// "How many children under 18 live in your household?" and variants
    pub const CHILDREN_IN_HOUSEHOLD: &str = r"(?i)how\s+many\b.*\bchild(ren)?\b";

    /// "Are you currently employed?" and variants
    pub const EMPLOYED_AT_ENROLLMENT: &str = r"(?i)\bemploy(ed|ment)\b";
}

/// Default field delimiter for participant exports
pub const DEFAULT_DELIMITER: u8 = b',';

// =============================================================================
// Configuration
// =============================================================================

/// Primary environment variable holding the storage connection string
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Fallback environment variable for the connection string
pub const DATABASE_URL_FALLBACK_ENV: &str = "EUC_DATABASE_URL";

/// Environment variable holding the default input export path
pub const INPUT_FILE_ENV: &str = "EUC_INPUT_FILE";

// =============================================================================
// Field Encodings
// =============================================================================

/// Tokens accepted as boolean true (compared case-insensitively)
pub const TRUE_TOKENS: &[&str] = &["yes", "true", "1"];

/// Tokens accepted as boolean false (compared case-insensitively)
pub const FALSE_TOKENS: &[&str] = &["no", "false", "0"];

/// Date-time formats tried in order for enrollment dates
pub const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// ISO date-times carrying a numeric offset, tried after RFC 3339
pub const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
];

/// Date-only formats tried after the date-time formats
pub const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

// =============================================================================
// Summary Metrics
// =============================================================================

/// Metric names and classification notes persisted to the metrics table
pub mod metrics {
    pub const TOTAL_FAMILIES: &str = "total_families";
    pub const GRADUATED_COUNT: &str = "graduated_count";
    pub const ACTIVE_COUNT: &str = "active_count";
    pub const TOTAL_WAGE_GAINS: &str = "total_wage_gains";
    pub const GRADUATION_RATE: &str = "graduation_rate";

    pub const NOTE_PROGRAM: &str = "program";
    pub const NOTE_OUTCOMES: &str = "outcomes";
    pub const NOTE_FINANCIAL: &str = "financial";
}

/// Outcome category values counted by the aggregator (case-insensitive)
pub const OUTCOME_GRADUATED: &str = "graduated";
pub const OUTCOME_ACTIVE: &str = "active";

// =============================================================================
// Federal Poverty Level
// =============================================================================

/// FPL tier lower bounds (percent of FPL)
pub mod fpl {
    pub const GRADUATION: f64 = 225.0;
    pub const SCHOOL_MEALS_CLIFF: f64 = 185.0;
    pub const LIHEAP_CLIFF: f64 = 150.0;
    pub const SNAP_CLIFF: f64 = 130.0;
    pub const POVERTY: f64 = 100.0;
    pub const DEEP_POVERTY: f64 = 50.0;
}

/// Average annual benefit values used for cliff exposure estimates (USD)
pub mod benefits {
    pub const SNAP_ANNUAL: f64 = 4800.0;
    pub const TENNCARE_ADULT: f64 = 6000.0;
    pub const CHILDCARE_PER_CHILD: f64 = 6000.0;
    pub const LIHEAP_ANNUAL: f64 = 600.0;
    pub const SCHOOL_LUNCH_PER_CHILD: f64 = 1800.0;
}

/// Children assumed for a household whose children count is unknown
pub const DEFAULT_CHILDREN_FOR_CLIFF: i64 = 1;

/// Program investment the conservative ROI is measured against (USD)
pub const PROGRAM_INVESTMENT: f64 = 25_000_000.0;

// =============================================================================
// Display
// =============================================================================

/// Progress bar template for the record loading loop
pub const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";
