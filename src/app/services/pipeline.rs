//! End-to-end ingestion pipeline
//!
//! Runs the six steps strictly in order against one store:
//!
//! 1. Read and parse the export
//! 2. Scan for distinct counties and navigators
//! 3. Wipe every table, children first
//! 4. Insert the resolved counties and navigators
//! 5. Load participant and outcome pairs row by row
//! 6. Aggregate and persist the summary metrics
//!
//! Only step 5 isolates failures; an error in any other step aborts the run.
//! Post-run storage contents are a pure function of the input file.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app::models::TableCounts;
use crate::app::services::entity_resolver::DistinctEntities;
use crate::app::services::metrics_aggregator::{persist_summary, DashboardSnapshot, ProgramSummary};
use crate::app::services::record_loader::{LoadStats, RecordLoader};
use crate::app::services::storage::ProgramStore;
use crate::app::services::tabular_reader::{ParsedTable, TabularReader};
use crate::constants::columns;
use crate::Result;

/// Per-run pipeline settings
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub delimiter: u8,
    pub metric_date: NaiveDate,
    pub show_progress: bool,
    /// Run against a scratch store; reported as such
    pub dry_run: bool,
    /// Where to write the dashboard snapshot, if anywhere
    pub export_path: Option<PathBuf>,
}

/// Everything the operator sees at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub source: String,
    pub dry_run: bool,
    pub rows_found: usize,
    /// Expected header names absent from the export; their fields load as null
    pub missing_columns: Vec<String>,
    pub counties_inserted: usize,
    pub navigators_inserted: usize,
    pub load: LoadStats,
    pub metric_date: NaiveDate,
    pub summary: ProgramSummary,
    pub table_counts: TableCounts,
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct IngestPipeline {
    options: PipelineOptions,
}

impl IngestPipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Step 1: read the export
    pub async fn read(&self, input: &Path) -> Result<ParsedTable> {
        info!("Step 1/6: reading {}", input.display());
        let table = TabularReader::new(self.options.delimiter)
            .read_file(input)
            .await?;
        info!("Found {} data rows", table.row_count());
        Ok(table)
    }

    /// Steps 2 to 6 over an already parsed export
    pub fn load(
        &self,
        store: &dyn ProgramStore,
        table: &ParsedTable,
        source: &str,
    ) -> Result<IngestReport> {
        let missing_columns = table.columns.missing_columns(columns::EXPECTED);
        if !missing_columns.is_empty() {
            warn!(
                "Export is missing {} expected columns: {}",
                missing_columns.len(),
                missing_columns.join(", ")
            );
        }

        info!("Step 2/6: scanning for counties and navigators");
        let distinct = DistinctEntities::scan(table);

        info!("Step 3/6: clearing existing data");
        store.clear_all()?;

        info!("Step 4/6: inserting counties and navigators");
        let resolved = distinct.insert_into(store)?;

        info!("Step 5/6: loading participants and outcomes");
        let load = RecordLoader::new(self.options.show_progress).load(store, table, &resolved);
        info!("{}", load.summary());

        info!("Step 6/6: computing summary metrics");
        let summary = ProgramSummary::from_table(table);
        persist_summary(store, &summary, self.options.metric_date)?;

        let snapshot_path = match &self.options.export_path {
            Some(path) => {
                DashboardSnapshot::build(table, self.options.metric_date)?.write_to(path)?;
                Some(path.clone())
            }
            None => None,
        };

        let table_counts = store.table_counts()?;
        debug!("Table counts after run: {:?}", table_counts);

        Ok(IngestReport {
            source: source.to_string(),
            dry_run: self.options.dry_run,
            rows_found: table.row_count(),
            missing_columns: missing_columns.into_iter().map(str::to_string).collect(),
            counties_inserted: resolved.counties.len(),
            navigators_inserted: resolved.navigators.len(),
            load,
            metric_date: self.options.metric_date,
            summary,
            table_counts,
            snapshot_path,
        })
    }

    /// Read then load
    pub async fn run(&self, store: &dyn ProgramStore, input: &Path) -> Result<IngestReport> {
        let table = self.read(input).await?;
        self.load(store, &table, &input.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::storage::SqliteStore;

    fn options() -> PipelineOptions {
        PipelineOptions {
            delimiter: b',',
            metric_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            show_progress: false,
            dry_run: false,
            export_path: None,
        }
    }

    fn table(content: &str) -> ParsedTable {
        TabularReader::default().read_str(content, "test.csv").unwrap()
    }

    #[test]
    fn test_load_reports_every_step() {
        let store = SqliteStore::open_in_memory().unwrap();
        let table = table(
            "participant_id,emp_county,emp_navigator,outcome_category,emp_wage_increases_since_enrollment\n\
             P1,Putnam,Jane,graduated,12000\n\
             P2,Overton,,active,-500\n",
        );

        let report = IngestPipeline::new(options())
            .load(&store, &table, "test.csv")
            .unwrap();

        assert_eq!(report.rows_found, 2);
        assert_eq!(report.counties_inserted, 2);
        assert_eq!(report.navigators_inserted, 1);
        assert_eq!(report.load.loaded, 2);
        assert_eq!(report.load.errors, 0);
        assert_eq!(report.summary.graduation_rate, 50.0);
        assert_eq!(
            report.table_counts,
            TableCounts {
                counties: 2,
                navigators: 1,
                participants: 2,
                outcomes: 2,
                metrics: 5,
            }
        );
        assert_eq!(report.snapshot_path, None);
        assert!(report.missing_columns.contains(&"emp_enrollment_date".to_string()));
        assert!(!report.missing_columns.contains(&"participant_id".to_string()));
        assert_eq!(report.missing_columns.len(), columns::EXPECTED.len() - 5);
    }

    #[test]
    fn test_full_header_reports_no_missing_columns() {
        let store = SqliteStore::open_in_memory().unwrap();
        let header = columns::EXPECTED.join(",");
        let table = table(&format!("{header}\n"));

        let report = IngestPipeline::new(options())
            .load(&store, &table, "test.csv")
            .unwrap();
        assert!(report.missing_columns.is_empty());
    }

    #[test]
    fn test_load_replaces_previous_contents() {
        let store = SqliteStore::open_in_memory().unwrap();
        let pipeline = IngestPipeline::new(options());

        pipeline
            .load(&store, &table("participant_id,emp_county\nP1,Clay\nP2,White\nP3,Jackson\n"), "a")
            .unwrap();
        let report = pipeline
            .load(&store, &table("participant_id,emp_county\nP9,Clay\n"), "b")
            .unwrap();

        assert_eq!(report.table_counts.counties, 1);
        assert_eq!(report.table_counts.participants, 1);
        assert_eq!(report.table_counts.metrics, 5);
        assert!(store.find_participant("P1").unwrap().is_none());
    }

    #[test]
    fn test_unwritable_export_fails_run() {
        let store = SqliteStore::open_in_memory().unwrap();
        let table = table("participant_id,emp_county\nP1,Clay\n");

        let mut opts = options();
        opts.export_path = Some(PathBuf::from("/dev/null/snapshot.json"));
        let result = IngestPipeline::new(opts).load(&store, &table, "test.csv");

        assert!(result.is_err());
    }

    #[test]
    fn test_export_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        let store = SqliteStore::open_in_memory().unwrap();
        let mut opts = options();
        opts.export_path = Some(path.clone());

        let report = IngestPipeline::new(opts)
            .load(&store, &table("participant_id,emp_current_fpl\nP1,120\n"), "test.csv")
            .unwrap();

        assert_eq!(report.snapshot_path.as_deref(), Some(path.as_path()));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_run_reads_file_then_loads() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("participants.csv");
        std::fs::write(&input, "participant_id,outcome_category\nP1,graduated\n").unwrap();
        let store = SqliteStore::open_in_memory().unwrap();

        let report = IngestPipeline::new(options()).run(&store, &input).await.unwrap();

        assert_eq!(report.rows_found, 1);
        assert_eq!(report.summary.graduated_count, 1);
        assert_eq!(report.source, input.display().to_string());
    }

    #[tokio::test]
    async fn test_run_missing_file_touches_nothing() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_county("Clay").unwrap();

        let result = IngestPipeline::new(options())
            .run(&store, Path::new("/nonexistent/participants.csv"))
            .await;

        assert!(matches!(result, Err(crate::Error::FileNotFound { .. })));
        assert_eq!(store.table_counts().unwrap().counties, 1);
    }
}
