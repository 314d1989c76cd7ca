//! Integration tests for the full ingestion pipeline
//!
//! These tests write real exports to a temporary directory and load them into
//! SQLite databases on disk, checking what ends up stored.

use chrono::NaiveDate;
use euc_ingest::app::models::TableCounts;
use euc_ingest::app::services::pipeline::{IngestPipeline, IngestReport, PipelineOptions};
use euc_ingest::app::services::storage::{ProgramStore, SqliteStore};
use euc_ingest::cli::commands::ingest::ingest_with_config;
use euc_ingest::cli::commands::metrics::read_listing;
use euc_ingest::config::{Config, ConfigOverrides};
use euc_ingest::Error;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCENARIO_CSV: &str = "\
participant_id,emp_county,emp_navigator,outcome_category,emp_wage_increases_since_enrollment
P1,Putnam,Jane,graduated,12000
P2,Overton,,active,-500
";

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

fn options() -> PipelineOptions {
    PipelineOptions {
        delimiter: b',',
        metric_date: run_date(),
        show_progress: false,
        dry_run: false,
        export_path: None,
    }
}

fn write_export(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write export fixture");
    path
}

async fn ingest_file(db: &Path, input: &Path) -> IngestReport {
    let store = SqliteStore::open(db).expect("Failed to open database");
    IngestPipeline::new(options())
        .run(&store, input)
        .await
        .expect("Ingest should complete")
}

fn metric_values(store: &SqliteStore) -> Vec<(String, f64, Option<String>)> {
    store
        .list_metrics()
        .unwrap()
        .into_iter()
        .map(|m| (m.record.metric_name, m.record.metric_value, m.record.notes))
        .collect()
}

fn config(overrides: ConfigOverrides) -> Config {
    Config::load_with_env(&overrides, |_| None).expect("Config should load")
}

/// Two-row export with one blank navigator
#[tokio::test]
async fn test_two_row_scenario() {
    let dir = TempDir::new().unwrap();
    let input = write_export(&dir, "participants.csv", SCENARIO_CSV);
    let db = dir.path().join("euc.db");

    let report = ingest_file(&db, &input).await;
    assert_eq!(report.rows_found, 2);
    assert_eq!(report.load.loaded, 2);
    assert_eq!(report.load.errors, 0);

    let store = SqliteStore::open(&db).unwrap();
    assert_eq!(
        store.table_counts().unwrap(),
        TableCounts {
            counties: 2,
            navigators: 1,
            participants: 2,
            outcomes: 2,
            metrics: 5,
        }
    );

    let mut counties: Vec<String> = store
        .list_counties()
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    counties.sort();
    assert_eq!(counties, vec!["Overton", "Putnam"]);

    let navigators = store.list_navigators().unwrap();
    assert_eq!(navigators.len(), 1);
    assert_eq!(navigators[0].name, "Jane");

    let p1 = store.find_participant("P1").unwrap().unwrap();
    assert_eq!(p1.record.navigator_id.as_deref(), Some(navigators[0].id.as_str()));
    assert_eq!(p1.record.county.as_deref(), Some("Putnam"));

    let p2 = store.find_participant("P2").unwrap().unwrap();
    assert_eq!(p2.record.navigator_id, None);
    assert_eq!(p2.record.navigator_name, None);

    let outcome = store.find_outcome(&p2.id).unwrap().unwrap();
    assert_eq!(outcome.record.wage_change, Some(-500.0));
    assert_eq!(outcome.record.outcome_category.as_deref(), Some("active"));

    assert_eq!(
        metric_values(&store),
        vec![
            ("total_families".to_string(), 2.0, Some("program".to_string())),
            ("graduated_count".to_string(), 1.0, Some("outcomes".to_string())),
            ("active_count".to_string(), 1.0, Some("outcomes".to_string())),
            ("total_wage_gains".to_string(), 12000.0, Some("financial".to_string())),
            ("graduation_rate".to_string(), 50.0, Some("outcomes".to_string())),
        ]
    );
    assert!(
        store
            .list_metrics()
            .unwrap()
            .iter()
            .all(|m| m.record.metric_date == run_date())
    );
}

/// A duplicate participant id fails only its own row
#[tokio::test]
async fn test_duplicate_row_is_isolated() {
    let dir = TempDir::new().unwrap();
    let input = write_export(
        &dir,
        "participants.csv",
        "participant_id,emp_county,outcome_category\n\
         P1,Clay,graduated\n\
         P1,Clay,active\n\
         P3,White,active\n",
    );
    let db = dir.path().join("euc.db");

    let report = ingest_file(&db, &input).await;
    assert_eq!(report.load.errors, 1);
    assert_eq!(report.load.loaded, 2);
    assert_eq!(report.load.failures[0].participant_id.as_deref(), Some("P1"));
    assert!(report.load.failures[0].duplicate);

    let store = SqliteStore::open(&db).unwrap();
    assert!(store.find_participant("P1").unwrap().is_some());
    assert!(store.find_participant("P3").unwrap().is_some());
    assert_eq!(store.table_counts().unwrap().participants, 2);
    assert_eq!(store.table_counts().unwrap().outcomes, 2);

    // Aggregates still cover every parsed row
    assert_eq!(report.summary.total_families, 3);
    assert_eq!(report.summary.active_count, 2);
}

/// Running twice leaves the same counts and metrics
#[tokio::test]
async fn test_rerun_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let input = write_export(&dir, "participants.csv", SCENARIO_CSV);
    let db = dir.path().join("nested").join("euc.db");

    let first = ingest_file(&db, &input).await;
    let first_metrics = metric_values(&SqliteStore::open(&db).unwrap());

    let second = ingest_file(&db, &input).await;
    let second_metrics = metric_values(&SqliteStore::open(&db).unwrap());

    assert_eq!(first.table_counts, second.table_counts);
    assert_eq!(second.table_counts.metrics, 5);
    assert_eq!(first_metrics, second_metrics);
}

/// Quoted fields keep embedded delimiters
#[tokio::test]
async fn test_quoted_county_with_comma() {
    let dir = TempDir::new().unwrap();
    let input = write_export(
        &dir,
        "participants.csv",
        "participant_id,emp_county,emp_navigator\n\
         P1,\"Putnam, TN\",\"Lee, Jane\"\n",
    );
    let db = dir.path().join("euc.db");

    ingest_file(&db, &input).await;

    let store = SqliteStore::open(&db).unwrap();
    assert_eq!(store.list_counties().unwrap()[0].name, "Putnam, TN");
    let p1 = store.find_participant("P1").unwrap().unwrap();
    assert_eq!(p1.record.navigator_name.as_deref(), Some("Lee, Jane"));
    assert!(p1.record.navigator_id.is_some());
}

/// A quoted field after a space does not shift later columns
#[tokio::test]
async fn test_spaced_quoted_county_resolves_navigator() {
    let dir = TempDir::new().unwrap();
    let input = write_export(
        &dir,
        "participants.csv",
        "participant_id,emp_county,emp_navigator,outcome_category\n\
         P1, \"Putnam, TN\", Jane, graduated\n",
    );
    let db = dir.path().join("euc.db");

    let report = ingest_file(&db, &input).await;
    assert_eq!(report.counties_inserted, 1);
    assert_eq!(report.summary.graduated_count, 1);

    let store = SqliteStore::open(&db).unwrap();
    assert_eq!(store.list_counties().unwrap()[0].name, "Putnam, TN");
    let navigators = store.list_navigators().unwrap();
    assert_eq!(navigators.len(), 1);
    assert_eq!(navigators[0].name, "Jane");
    let p1 = store.find_participant("P1").unwrap().unwrap();
    assert_eq!(p1.record.navigator_id.as_deref(), Some(navigators[0].id.as_str()));
}

/// Dry runs never open the configured database
#[tokio::test]
async fn test_dry_run_leaves_storage_untouched() {
    let dir = TempDir::new().unwrap();
    let input = write_export(&dir, "participants.csv", SCENARIO_CSV);
    let db = dir.path().join("euc.db");

    let report = ingest_with_config(
        &config(ConfigOverrides {
            database_url: Some(format!("sqlite://{}", db.display())),
            input_file: Some(input),
            dry_run: true,
            metric_date: Some(run_date()),
            ..Default::default()
        }),
        false,
    )
    .await
    .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.table_counts.participants, 2);
    assert_eq!(report.summary.graduation_rate, 50.0);
    assert!(!db.exists());
}

/// Existing data survives a dry run
#[tokio::test]
async fn test_dry_run_keeps_previous_load() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("euc.db");
    let first = write_export(&dir, "first.csv", SCENARIO_CSV);
    ingest_file(&db, &first).await;

    let second = write_export(&dir, "second.csv", "participant_id\nP7\nP8\nP9\n");
    ingest_with_config(
        &config(ConfigOverrides {
            database_url: Some(db.display().to_string()),
            input_file: Some(second),
            dry_run: true,
            ..Default::default()
        }),
        false,
    )
    .await
    .unwrap();

    let store = SqliteStore::open(&db).unwrap();
    assert_eq!(store.table_counts().unwrap().participants, 2);
    assert!(store.find_participant("P7").unwrap().is_none());
}

/// A writing run without a connection string is a setup error
#[tokio::test]
async fn test_missing_database_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = write_export(&dir, "participants.csv", SCENARIO_CSV);

    let result = ingest_with_config(
        &config(ConfigOverrides {
            input_file: Some(input),
            ..Default::default()
        }),
        false,
    )
    .await;

    assert!(matches!(result, Err(Error::Configuration { .. })));
}

#[tokio::test]
async fn test_missing_input_is_fatal() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("euc.db");

    let result = ingest_with_config(
        &config(ConfigOverrides {
            database_url: Some(db.display().to_string()),
            input_file: Some(dir.path().join("missing.csv")),
            ..Default::default()
        }),
        false,
    )
    .await;

    assert!(matches!(result, Err(Error::FileNotFound { .. })));
    assert!(!db.exists());
}

/// The metrics listing reads back what the last run stored
#[tokio::test]
async fn test_metrics_listing_after_ingest() {
    let dir = TempDir::new().unwrap();
    let input = write_export(&dir, "participants.csv", SCENARIO_CSV);
    let db = dir.path().join("euc.db");
    let url = format!("sqlite://{}", db.display());

    ingest_with_config(
        &config(ConfigOverrides {
            database_url: Some(url.clone()),
            input_file: Some(input),
            metric_date: Some(run_date()),
            ..Default::default()
        }),
        false,
    )
    .await
    .unwrap();

    let listing = read_listing(&config(ConfigOverrides {
        database_url: Some(url),
        ..Default::default()
    }))
    .await
    .unwrap();

    assert_eq!(listing.table_counts.counties, 2);
    assert_eq!(listing.metrics.len(), 5);
    assert_eq!(listing.metrics[0].record.metric_name, "total_families");
}

/// Listing a mistyped database path fails without creating it
#[tokio::test]
async fn test_metrics_listing_missing_database() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("data").join("eu.db");

    let result = read_listing(&config(ConfigOverrides {
        database_url: Some(format!("sqlite://{}", db.display())),
        ..Default::default()
    }))
    .await;

    assert!(matches!(result, Err(Error::FileNotFound { .. })));
    assert!(!db.exists());
    assert!(!dir.path().join("data").exists());
}

/// Semicolon exports with the dashboard snapshot written alongside
#[tokio::test]
async fn test_semicolon_export_with_snapshot() {
    let dir = TempDir::new().unwrap();
    let input = write_export(
        &dir,
        "participants.csv",
        "participant_id;emp_county;emp_current_fpl;emp_wage_increases_since_enrollment;outcome_category\n\
         P1;Putnam;120;5000;graduated\n\
         P2;Putnam;240;;graduated\n",
    );
    let snapshot = dir.path().join("out").join("dashboard.json");

    let report = ingest_with_config(
        &config(ConfigOverrides {
            input_file: Some(input),
            delimiter: Some(';'),
            dry_run: true,
            export_path: Some(snapshot.clone()),
            metric_date: Some(run_date()),
            ..Default::default()
        }),
        false,
    )
    .await
    .unwrap();

    assert_eq!(report.summary.graduated_count, 2);
    assert_eq!(report.snapshot_path.as_deref(), Some(snapshot.as_path()));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&snapshot).unwrap()).unwrap();
    assert_eq!(json["summary"]["total_participants"], 2);
    assert_eq!(json["fpl_distribution"]["graduated"], 1);
    assert_eq!(json["cliff_exposure"]["summary"]["families_in_cliff_zone"], 1);
    assert_eq!(json["county_metrics"]["Putnam"]["participants"], 2);
}
