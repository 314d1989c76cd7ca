//! SQLite-backed program store
//!
//! Opens (or creates) the dashboard database, applies the schema and enables
//! foreign-key enforcement. Surrogate ids are UUID v4 strings generated here.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use super::schema::{DATE_STORAGE_FORMAT, DATETIME_STORAGE_FORMAT, SCHEMA_SQL};
use super::{ProgramStore, StorageTarget, TABLES};
use crate::app::models::{
    County, EntityId, Metric, MetricRecord, Navigator, Outcome, OutcomeRecord, Participant,
    ParticipantRecord, TableCounts,
};
use crate::{Error, Result};

pub struct SqliteStore {
    conn: Connection,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl SqliteStore {
    pub fn open_target(target: &StorageTarget) -> Result<Self> {
        match target {
            StorageTarget::Memory => Self::open_in_memory(),
            StorageTarget::File(path) => Self::open(path),
        }
    }

    /// Open a target without creating a missing database file
    pub fn open_existing_target(target: &StorageTarget) -> Result<Self> {
        match target {
            StorageTarget::Memory => Self::open_in_memory(),
            StorageTarget::File(path) => Self::open_existing(path),
        }
    }

    /// Open (or create) a database file and apply the schema
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::io(
                        format!("Failed to create database directory {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let conn = Connection::open(path).map_err(|e| {
            Error::storage(format!("Failed to open database {}", path.display()), e)
        })?;
        info!("Opened database: {}", path.display());

        Self::initialize(conn)
    }

    /// Open a database file that must already exist
    pub fn open_existing(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::file_not_found(path.display().to_string()));
        }

        // no SQLITE_OPEN_CREATE
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| {
            Error::storage(format!("Failed to open database {}", path.display()), e)
        })?;
        info!("Opened existing database: {}", path.display());

        Self::initialize(conn)
    }

    /// Open a private in-memory database. Useful for testing.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::storage("Failed to open in-memory database", e))?;
        debug!("Opened in-memory database");

        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| Error::storage("Failed to enable foreign keys", e))?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::storage("Failed to apply schema", e))?;

        Ok(Self { conn })
    }

    fn new_id() -> EntityId {
        Uuid::new_v4().to_string()
    }

    fn insert_named(&self, table: &str, name: &str) -> Result<EntityId> {
        let id = Self::new_id();
        self.conn
            .execute(
                &format!("INSERT INTO {table} (id, name) VALUES (?1, ?2)"),
                params![id, name],
            )
            .map_err(|e| Error::storage(format!("Failed to insert into {table} '{name}'"), e))?;
        Ok(id)
    }

    fn list_named(&self, table: &str) -> Result<Vec<(EntityId, String)>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT id, name FROM {table} ORDER BY name"))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

fn format_datetime(value: &Option<NaiveDateTime>) -> Option<String> {
    value.map(|dt| dt.format(DATETIME_STORAGE_FORMAT).to_string())
}

fn read_datetime(row: &Row<'_>, index: usize) -> rusqlite::Result<Option<NaiveDateTime>> {
    let raw: Option<String> = row.get(index)?;
    raw.map(|text| {
        NaiveDateTime::parse_from_str(&text, DATETIME_STORAGE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn read_date(row: &Row<'_>, index: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(index)?;
    NaiveDate::parse_from_str(&text, DATE_STORAGE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

impl ProgramStore for SqliteStore {
    fn clear_all(&self) -> Result<()> {
        for table in TABLES.iter().rev() {
            let deleted = self
                .conn
                .execute(&format!("DELETE FROM {table}"), [])
                .map_err(|e| Error::storage(format!("Failed to clear {table}"), e))?;
            debug!("Cleared {} rows from {}", deleted, table);
        }
        Ok(())
    }

    fn insert_county(&self, name: &str) -> Result<EntityId> {
        self.insert_named("counties", name)
    }

    fn insert_navigator(&self, name: &str) -> Result<EntityId> {
        self.insert_named("navigators", name)
    }

    fn insert_participant(&self, record: &ParticipantRecord) -> Result<EntityId> {
        let id = Self::new_id();
        self.conn
            .execute(
                "INSERT INTO participants (
                    id, participant_id, county, enrollment_status, enrollment_date,
                    navigator_id, navigator_name, household_size, children_in_household,
                    employed_at_enrollment
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    id,
                    record.participant_id,
                    record.county,
                    record.enrollment_status,
                    format_datetime(&record.enrollment_date),
                    record.navigator_id,
                    record.navigator_name,
                    record.household_size,
                    record.children_in_household,
                    record.employed_at_enrollment,
                ],
            )
            .map_err(|e| {
                Error::storage(
                    format!(
                        "Failed to insert participant '{}'",
                        record.participant_id.as_deref().unwrap_or("<missing>")
                    ),
                    e,
                )
            })?;
        Ok(id)
    }

    fn insert_outcome(&self, record: &OutcomeRecord) -> Result<EntityId> {
        let id = Self::new_id();
        self.conn
            .execute(
                "INSERT INTO outcomes (
                    id, participant_id, fpl_at_enrollment, current_fpl, fpl_change,
                    wage_change, days_in_program, outcome_category
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id,
                    record.participant_id,
                    record.fpl_at_enrollment,
                    record.current_fpl,
                    record.fpl_change,
                    record.wage_change,
                    record.days_in_program,
                    record.outcome_category,
                ],
            )
            .map_err(|e| {
                Error::storage(
                    format!("Failed to insert outcome for participant {}", record.participant_id),
                    e,
                )
            })?;
        Ok(id)
    }

    fn insert_metric(&self, record: &MetricRecord) -> Result<EntityId> {
        let id = Self::new_id();
        self.conn
            .execute(
                "INSERT INTO metrics (id, metric_name, metric_value, metric_date, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id,
                    record.metric_name,
                    record.metric_value,
                    record.metric_date.format(DATE_STORAGE_FORMAT).to_string(),
                    record.notes,
                ],
            )
            .map_err(|e| {
                Error::storage(format!("Failed to insert metric '{}'", record.metric_name), e)
            })?;
        Ok(id)
    }

    fn table_counts(&self) -> Result<TableCounts> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .map_err(|e| Error::storage(format!("Failed to count {table}"), e))?;
            Ok(n as usize)
        };

        Ok(TableCounts {
            counties: count("counties")?,
            navigators: count("navigators")?,
            participants: count("participants")?,
            outcomes: count("outcomes")?,
            metrics: count("metrics")?,
        })
    }

    fn list_counties(&self) -> Result<Vec<County>> {
        Ok(self
            .list_named("counties")?
            .into_iter()
            .map(|(id, name)| County { id, name })
            .collect())
    }

    fn list_navigators(&self) -> Result<Vec<Navigator>> {
        Ok(self
            .list_named("navigators")?
            .into_iter()
            .map(|(id, name)| Navigator { id, name })
            .collect())
    }

    fn list_metrics(&self) -> Result<Vec<Metric>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, metric_name, metric_value, metric_date, notes
             FROM metrics ORDER BY rowid",
        )?;
        let metrics = stmt
            .query_map([], |row| {
                Ok(Metric {
                    id: row.get(0)?,
                    record: MetricRecord {
                        metric_name: row.get(1)?,
                        metric_value: row.get(2)?,
                        metric_date: read_date(row, 3)?,
                        notes: row.get(4)?,
                    },
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(metrics)
    }

    fn find_participant(&self, participant_id: &str) -> Result<Option<Participant>> {
        let participant = self
            .conn
            .query_row(
                "SELECT id, participant_id, county, enrollment_status, enrollment_date,
                        navigator_id, navigator_name, household_size, children_in_household,
                        employed_at_enrollment
                 FROM participants WHERE participant_id = ?1",
                params![participant_id],
                |row| {
                    Ok(Participant {
                        id: row.get(0)?,
                        record: ParticipantRecord {
                            participant_id: row.get(1)?,
                            county: row.get(2)?,
                            enrollment_status: row.get(3)?,
                            enrollment_date: read_datetime(row, 4)?,
                            navigator_id: row.get(5)?,
                            navigator_name: row.get(6)?,
                            household_size: row.get(7)?,
                            children_in_household: row.get(8)?,
                            employed_at_enrollment: row.get(9)?,
                        },
                    })
                },
            )
            .optional()?;
        Ok(participant)
    }

    fn find_outcome(&self, participant_entity_id: &str) -> Result<Option<Outcome>> {
        let outcome = self
            .conn
            .query_row(
                "SELECT id, participant_id, fpl_at_enrollment, current_fpl, fpl_change,
                        wage_change, days_in_program, outcome_category
                 FROM outcomes WHERE participant_id = ?1",
                params![participant_entity_id],
                |row| {
                    Ok(Outcome {
                        id: row.get(0)?,
                        record: OutcomeRecord {
                            participant_id: row.get(1)?,
                            fpl_at_enrollment: row.get(2)?,
                            current_fpl: row.get(3)?,
                            fpl_change: row.get(4)?,
                            wage_change: row.get(5)?,
                            days_in_program: row.get(6)?,
                            outcome_category: row.get(7)?,
                        },
                    })
                },
            )
            .optional()?;
        Ok(outcome)
    }
}
