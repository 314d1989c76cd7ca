//! Dashboard table definitions

/// Schema applied on every open; safe to run against an existing database
pub const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS counties (
    id   TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS navigators (
    id   TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS participants (
    id                     TEXT PRIMARY KEY,
    participant_id         TEXT NOT NULL UNIQUE,
    county                 TEXT,
    enrollment_status      TEXT,
    enrollment_date        TEXT,
    navigator_id           TEXT REFERENCES navigators(id),
    navigator_name         TEXT,
    household_size         INTEGER,
    children_in_household  INTEGER,
    employed_at_enrollment INTEGER
);

CREATE TABLE IF NOT EXISTS outcomes (
    id                TEXT PRIMARY KEY,
    participant_id    TEXT NOT NULL REFERENCES participants(id),
    fpl_at_enrollment REAL,
    current_fpl       REAL,
    fpl_change        REAL,
    wage_change       REAL,
    days_in_program   INTEGER,
    outcome_category  TEXT
);

CREATE TABLE IF NOT EXISTS metrics (
    id           TEXT PRIMARY KEY,
    metric_name  TEXT NOT NULL,
    metric_value REAL NOT NULL,
    metric_date  TEXT NOT NULL,
    notes        TEXT
);

CREATE INDEX IF NOT EXISTS idx_outcomes_participant ON outcomes(participant_id);
CREATE INDEX IF NOT EXISTS idx_participants_navigator ON participants(navigator_id);
";

/// Timestamp layout for naive date-time columns
pub const DATETIME_STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Layout for date-only columns
pub const DATE_STORAGE_FORMAT: &str = "%Y-%m-%d";
