//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then environment variables, then
//! command-line overrides. The connection string has no default; a run that
//! writes to storage refuses to start without one.

use crate::app::services::storage::StorageTarget;
use crate::constants::{
    DATABASE_URL_ENV, DATABASE_URL_FALLBACK_ENV, DEFAULT_DELIMITER, INPUT_FILE_ENV,
};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub ingest: IngestConfig,
}

/// Storage connection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `sqlite://<path>`, `sqlite::memory:`, `:memory:` or a bare path
    pub url: Option<String>,
}

/// Ingestion run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    pub input_file: Option<PathBuf>,
    pub delimiter: char,
    pub dry_run: bool,
    pub export_path: Option<PathBuf>,
    /// Date stamped on persisted metrics; today when unset
    pub metric_date: Option<NaiveDate>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            input_file: None,
            delimiter: DEFAULT_DELIMITER as char,
            dry_run: false,
            export_path: None,
            metric_date: None,
        }
    }
}

/// Command-line values that take precedence over the environment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub input_file: Option<PathBuf>,
    pub delimiter: Option<char>,
    pub dry_run: bool,
    pub export_path: Option<PathBuf>,
    pub metric_date: Option<NaiveDate>,
}

impl Config {
    /// Layer process environment and CLI overrides over the defaults
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        Self::load_with_env(overrides, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with an explicit environment lookup
    pub fn load_with_env<F>(overrides: &ConfigOverrides, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_env(env);
        config.apply_overrides(overrides);
        config.validate()?;

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_empty(DATABASE_URL_ENV).or_else(|| non_empty(DATABASE_URL_FALLBACK_ENV)) {
            debug!("Connection string taken from environment");
            self.database.url = Some(url);
        }

        if let Some(input) = non_empty(INPUT_FILE_ENV) {
            self.ingest.input_file = Some(PathBuf::from(input));
        }
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.database_url {
            self.database.url = Some(url.clone());
        }
        if let Some(input) = &overrides.input_file {
            self.ingest.input_file = Some(input.clone());
        }
        if let Some(delimiter) = overrides.delimiter {
            self.ingest.delimiter = delimiter;
        }
        if overrides.dry_run {
            self.ingest.dry_run = true;
        }
        if let Some(path) = &overrides.export_path {
            self.ingest.export_path = Some(path.clone());
        }
        if let Some(date) = overrides.metric_date {
            self.ingest.metric_date = Some(date);
        }
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.database.url {
            StorageTarget::parse(url)?;
        }

        if !self.ingest.delimiter.is_ascii() || self.ingest.delimiter == '"' {
            return Err(Error::configuration(format!(
                "Delimiter must be a single ASCII character other than '\"', got '{}'",
                self.ingest.delimiter
            )));
        }

        Ok(())
    }

    /// Storage target for a run that writes; missing configuration is fatal
    pub fn storage_target(&self) -> Result<StorageTarget> {
        let url = self.database.url.as_deref().ok_or_else(|| {
            Error::configuration(format!(
                "No database connection configured; set {} (or {}) or pass --database",
                DATABASE_URL_ENV, DATABASE_URL_FALLBACK_ENV
            ))
        })?;
        StorageTarget::parse(url)
    }

    /// Input export path; missing configuration is fatal
    pub fn input_file(&self) -> Result<PathBuf> {
        self.ingest.input_file.clone().ok_or_else(|| {
            Error::configuration(format!(
                "No input file given; pass <FILE> or set {}",
                INPUT_FILE_ENV
            ))
        })
    }

    /// Delimiter as a byte for the reader
    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees an ASCII delimiter
        self.ingest.delimiter as u8
    }

    /// Metric date, defaulting to today's local date
    pub fn metric_date(&self) -> NaiveDate {
        self.ingest
            .metric_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
