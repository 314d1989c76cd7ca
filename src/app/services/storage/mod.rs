//! Storage collaborator for the ingestion pipeline
//!
//! The pipeline only needs durable tables with unique-constraint and
//! foreign-key enforcement. [`ProgramStore`] names exactly the operations it
//! uses; [`SqliteStore`] provides them on top of SQLite.

use crate::app::models::{
    County, EntityId, Metric, MetricRecord, Navigator, Outcome, OutcomeRecord, Participant,
    ParticipantRecord, TableCounts,
};
use crate::{Error, Result};
use std::path::PathBuf;

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStore;

/// Tables written by the pipeline, in parent to child order
pub const TABLES: [&str; 5] = ["counties", "navigators", "participants", "outcomes", "metrics"];

/// Operations the pipeline performs against storage
///
/// Every insert returns the generated surrogate id. Calls are made strictly
/// one at a time; implementations need no internal synchronization.
pub trait ProgramStore {
    /// Delete every row from every table, children first
    fn clear_all(&self) -> Result<()>;

    fn insert_county(&self, name: &str) -> Result<EntityId>;

    fn insert_navigator(&self, name: &str) -> Result<EntityId>;

    fn insert_participant(&self, record: &ParticipantRecord) -> Result<EntityId>;

    fn insert_outcome(&self, record: &OutcomeRecord) -> Result<EntityId>;

    fn insert_metric(&self, record: &MetricRecord) -> Result<EntityId>;

    fn table_counts(&self) -> Result<TableCounts>;

    fn list_counties(&self) -> Result<Vec<County>>;

    fn list_navigators(&self) -> Result<Vec<Navigator>>;

    fn list_metrics(&self) -> Result<Vec<Metric>>;

    /// Look up a participant by its external natural key
    fn find_participant(&self, participant_id: &str) -> Result<Option<Participant>>;

    /// The outcome linked to a stored participant's generated id
    fn find_outcome(&self, participant_entity_id: &str) -> Result<Option<Outcome>>;
}

/// Where a connection string points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    /// Private in-process database, discarded on close
    Memory,
    /// Database file on disk, created when missing
    File(PathBuf),
}

impl StorageTarget {
    /// Interpret a connection string
    ///
    /// Accepts `sqlite::memory:`, `:memory:`, `sqlite://<path>`,
    /// `sqlite:<path>` or a bare filesystem path.
    pub fn parse(connection: &str) -> Result<Self> {
        let connection = connection.trim();
        if connection.is_empty() {
            return Err(Error::configuration("Connection string is empty"));
        }

        if connection == ":memory:" || connection == "sqlite::memory:" {
            return Ok(Self::Memory);
        }

        if let Some(path) = connection
            .strip_prefix("sqlite://")
            .or_else(|| connection.strip_prefix("sqlite:"))
        {
            if path.is_empty() {
                return Err(Error::configuration(format!(
                    "Connection string '{}' has no database path",
                    connection
                )));
            }
            return Ok(Self::File(PathBuf::from(path)));
        }

        if let Some((scheme, _)) = connection.split_once("://") {
            return Err(Error::configuration(format!(
                "Unsupported storage scheme '{}' (expected a sqlite connection string)",
                scheme
            )));
        }

        Ok(Self::File(PathBuf::from(connection)))
    }
}
