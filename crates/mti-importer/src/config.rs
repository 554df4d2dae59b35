//! Importer configuration
//!
//! Settings come from the process environment, which `main` seeds from an
//! optional `.env` file. Every value has a default except the bucket name, which
//! is only required for bucket sources.

use mti_common::{ImportError, Result};
use std::str::FromStr;
use std::time::Duration;

use crate::batch::DEFAULT_BATCH_SIZE;
use crate::index::MeiliConfig;
use crate::progress::DEFAULT_LOG_INTERVAL;
use crate::source::SourceKind;
use crate::storage::StorageConfig;
use crate::worker::{RetryPolicy, WorkerConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, DEFAULT_WORKERS};

/// Default index receiving terminology documents.
pub const DEFAULT_INDEX_NAME: &str = "terminologies";

/// Tuning for the read, batch and submit stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub index_name: String,
    pub batch_size: usize,
    pub workers: usize,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub log_interval: u64,
    /// Batches that may wait for a worker before the reader blocks
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            workers: DEFAULT_WORKERS,
            max_retries: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            log_interval: DEFAULT_LOG_INTERVAL,
            queue_capacity: DEFAULT_WORKERS * 2,
        }
    }
}

impl PipelineConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let workers = parse_or(&lookup, "IMPORT_WORKERS", defaults.workers)?;

        Ok(Self {
            index_name: lookup("MEILI_INDEX")
                .filter(|name| !name.is_empty())
                .unwrap_or(defaults.index_name),
            batch_size: parse_or(&lookup, "IMPORT_BATCH_SIZE", defaults.batch_size)?,
            workers,
            max_retries: parse_or(&lookup, "IMPORT_MAX_RETRIES", defaults.max_retries)?,
            retry_delay: Duration::from_millis(parse_or(
                &lookup,
                "IMPORT_RETRY_DELAY_MS",
                defaults.retry_delay.as_millis() as u64,
            )?),
            log_interval: parse_or(&lookup, "IMPORT_LOG_INTERVAL", defaults.log_interval)?,
            queue_capacity: parse_or(&lookup, "IMPORT_QUEUE_CAPACITY", workers.saturating_mul(2))?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.index_name.is_empty() {
            return Err(ImportError::config("Index name must not be empty"));
        }
        if self.batch_size == 0 {
            return Err(ImportError::config("Batch size must be greater than 0"));
        }
        if self.workers == 0 {
            return Err(ImportError::config("Worker count must be greater than 0"));
        }
        if self.max_retries == 0 {
            return Err(ImportError::config("Max retries must be greater than 0"));
        }
        if self.log_interval == 0 {
            return Err(ImportError::config("Log interval must be greater than 0"));
        }
        if self.queue_capacity == 0 {
            return Err(ImportError::config("Queue capacity must be greater than 0"));
        }
        Ok(())
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            workers: self.workers,
            queue_capacity: self.queue_capacity,
            index_name: self.index_name.clone(),
            retry: RetryPolicy {
                max_attempts: self.max_retries,
                delay: self.retry_delay,
            },
        }
    }
}

/// Everything the binary needs to run a command
#[derive(Debug, Clone)]
pub struct ImporterConfig {
    pub meili: MeiliConfig,
    pub storage: StorageConfig,
    pub pipeline: PipelineConfig,
    /// Used when the command line does not name a source type
    pub default_source: SourceKind,
}

impl ImporterConfig {
    /// Read the process environment. `main` loads `.env` beforehand.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let pipeline = PipelineConfig::from_lookup(&lookup)?;
        pipeline.validate()?;

        let default_source = match lookup("SOURCE_TYPE") {
            Some(value) if !value.is_empty() => value.parse()?,
            _ => SourceKind::default(),
        };

        Ok(Self {
            meili: MeiliConfig::from_lookup(&lookup),
            storage: StorageConfig::from_lookup(&lookup),
            pipeline,
            default_source,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|e| {
            ImportError::config(format!("Invalid value '{}' for {}: {}", raw, key, e))
        }),
        _ => Ok(default),
    }
}
