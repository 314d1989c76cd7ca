//! The record loading loop

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use super::row_mapping::RowMapper;
use super::stats::{LoadStats, RowFailure};
use crate::app::models::EntityId;
use crate::app::services::entity_resolver::ResolvedEntities;
use crate::app::services::storage::ProgramStore;
use crate::app::services::tabular_reader::{ParsedTable, SourceRow};
use crate::constants::PROGRESS_TEMPLATE;
use crate::Result;

/// Loader writing one participant and one outcome per export row
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordLoader {
    show_progress: bool,
}

impl RecordLoader {
    pub fn new(show_progress: bool) -> Self {
        Self { show_progress }
    }

    /// Load every row, isolating failures per row
    ///
    /// Errors building the row mapper (an invalid question pattern) are
    /// reported as a failure of every row rather than aborting.
    pub fn load(
        &self,
        store: &dyn ProgramStore,
        table: &ParsedTable,
        resolved: &ResolvedEntities,
    ) -> LoadStats {
        let mut stats = LoadStats::new();
        stats.total_rows = table.row_count();

        info!("Loading {} participant rows", table.row_count());

        let mapper = match RowMapper::new(&table.columns) {
            Ok(mapper) => mapper,
            Err(e) => {
                warn!("Cannot map export rows: {}", e);
                for (index, row) in table.rows.iter().enumerate() {
                    stats.add_failure(RowFailure {
                        row_index: index + 1,
                        line_number: row.line_number,
                        participant_id: None,
                        duplicate: false,
                        message: e.to_string(),
                    });
                }
                return stats;
            }
        };

        let progress = self
            .show_progress
            .then(|| create_progress_bar(table.row_count() as u64));

        for (index, row) in table.rows.iter().enumerate() {
            match load_row(store, &mapper, row, resolved) {
                Ok(participant_entity_id) => {
                    stats.loaded += 1;
                    debug!(
                        "Row {} stored as participant {}",
                        index + 1,
                        participant_entity_id
                    );
                }
                Err(e) => {
                    let participant_id = mapper.participant_key(row);
                    let duplicate = e.is_unique_violation();
                    warn!(
                        "Row {} (line {}, participant {}) failed{}: {}",
                        index + 1,
                        row.line_number,
                        participant_id.as_deref().unwrap_or("<missing>"),
                        if duplicate { " as a duplicate" } else { "" },
                        e
                    );
                    stats.add_failure(RowFailure {
                        row_index: index + 1,
                        line_number: row.line_number,
                        participant_id,
                        duplicate,
                        message: e.to_string(),
                    });
                }
            }

            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message(format!("Loaded {} rows", stats.loaded));
        }

        info!("{}", stats.summary());
        stats
    }
}

/// Insert one row's participant, then its outcome
fn load_row(
    store: &dyn ProgramStore,
    mapper: &RowMapper,
    row: &SourceRow,
    resolved: &ResolvedEntities,
) -> Result<EntityId> {
    let participant = mapper.participant(row, resolved);
    let participant_entity_id = store.insert_participant(&participant)?;

    let outcome = mapper.outcome(row, &participant_entity_id);
    store.insert_outcome(&outcome)?;

    Ok(participant_entity_id)
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message("Loading participants");
    pb
}
