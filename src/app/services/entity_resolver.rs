//! Entity resolution for counties and navigators
//!
//! Resolution runs in two halves around the storage wipe: [`DistinctEntities::scan`]
//! collects every distinct non-empty county and navigator name from the parsed
//! rows, then [`DistinctEntities::insert_into`] creates one storage entity per
//! name and returns the name to id maps used by the record loader.
//!
//! Insert failures here are not caught: the loader cannot run without complete
//! maps, so they abort the run.

use crate::app::models::EntityId;
use crate::app::services::storage::ProgramStore;
use crate::app::services::tabular_reader::ParsedTable;
use crate::constants::columns;
use crate::Result;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Distinct reference names found in the export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinctEntities {
    pub counties: BTreeSet<String>,
    pub navigators: BTreeSet<String>,
}

impl DistinctEntities {
    /// Scan every data row once for county and navigator names
    pub fn scan(table: &ParsedTable) -> Self {
        let distinct = Self {
            counties: collect_distinct(table, columns::COUNTY),
            navigators: collect_distinct(table, columns::NAVIGATOR),
        };

        info!(
            "Found {} distinct navigators and {} distinct counties",
            distinct.navigators.len(),
            distinct.counties.len()
        );
        distinct
    }

    /// Create one storage entity per name, counties first
    pub fn insert_into(&self, store: &dyn ProgramStore) -> Result<ResolvedEntities> {
        let mut resolved = ResolvedEntities::default();

        for name in &self.counties {
            let id = store.insert_county(name)?;
            debug!("Inserted county '{}' as {}", name, id);
            resolved.counties.insert(name.clone(), id);
        }
        info!("Inserted {} counties", resolved.counties.len());

        for name in &self.navigators {
            let id = store.insert_navigator(name)?;
            debug!("Inserted navigator '{}' as {}", name, id);
            resolved.navigators.insert(name.clone(), id);
        }
        info!("Inserted {} navigators", resolved.navigators.len());

        Ok(resolved)
    }
}

/// Non-empty values of one column, deduplicated
pub fn collect_distinct(table: &ParsedTable, column: &str) -> BTreeSet<String> {
    table
        .column_values(column)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// Name to generated id maps for the current run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEntities {
    pub counties: HashMap<String, EntityId>,
    pub navigators: HashMap<String, EntityId>,
}

impl ResolvedEntities {
    /// Navigator id for a name; empty or unknown names resolve to `None`
    pub fn navigator_id(&self, name: &str) -> Option<&EntityId> {
        if name.is_empty() {
            return None;
        }
        self.navigators.get(name)
    }
}
