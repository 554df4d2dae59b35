//! Streaming import pipeline
//!
//! Reads the source sequentially, parses each line, cuts the documents into
//! batches in source order and hands every batch to the worker pool. The
//! source is opened before any batch is formed, so a missing file aborts the
//! run without touching the index.

use mti_common::{Context, DocType, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

use crate::batch::{Batch, BatchAccumulator};
use crate::config::PipelineConfig;
use crate::index::IndexClient;
use crate::parser::RecordParser;
use crate::progress::ProgressTracker;
use crate::source::{LineSource, SourceSpec};
use crate::storage::ObjectStore;
use crate::worker::WorkerPool;

/// One import run
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub context: Context,
    pub doc_type: DocType,
    pub source: SourceSpec,
    pub has_header: bool,
    /// Field separator, already decoded
    pub delimiter: String,
}

/// Totals of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub processed: u64,
    pub dropped_batches: u64,
    pub dropped_documents: u64,
    pub elapsed: Duration,
}

pub struct Importer {
    index: Arc<dyn IndexClient>,
    store: Option<Arc<dyn ObjectStore>>,
    config: PipelineConfig,
}

impl Importer {
    pub fn new(
        index: Arc<dyn IndexClient>,
        store: Option<Arc<dyn ObjectStore>>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            index,
            store,
            config,
        }
    }

    /// Import every document of `request.source`.
    ///
    /// Source and read errors abort the run. Batches that cannot be written
    /// are dropped after their retries and only show up in the summary.
    #[instrument(skip(self, request), fields(source = %request.source, doc_type = %request.doc_type))]
    pub async fn run(&self, request: ImportRequest) -> Result<ImportSummary> {
        self.config.validate()?;
        let started = Instant::now();

        let mut source = LineSource::open(&request.source, self.store.as_deref()).await?;
        if request.has_header {
            source.skip_header().await?;
        }

        let parser = RecordParser::new(request.context, request.doc_type, request.delimiter.as_str());
        let progress = Arc::new(ProgressTracker::new(self.config.log_interval));
        let pool = WorkerPool::spawn(
            self.config.worker_config(),
            Arc::clone(&self.index),
            Arc::clone(&progress),
        );

        info!(
            index = %self.config.index_name,
            batch_size = self.config.batch_size,
            workers = self.config.workers,
            "Starting import"
        );

        let streamed = stream_batches(&mut source, &parser, self.config.batch_size, &pool).await;

        // Let the workers finish whatever was queued before reporting, even
        // when reading stopped on an error.
        pool.shutdown().await;

        let documents = match streamed {
            Ok(documents) => documents,
            Err(e) => {
                error!(
                    error = %e,
                    line = source.lines_read(),
                    "Reading {} failed",
                    source.origin()
                );
                return Err(e);
            }
        };
        drop(source);

        let snapshot = progress.snapshot();
        let elapsed = started.elapsed();

        info!(
            elapsed_secs = elapsed.as_secs_f64(),
            total = snapshot.processed,
            parsed = documents,
            rate = %format!("{:.0}/s", snapshot.throughput()),
            "Import completed in {:.2?}. Total records processed: {}",
            elapsed,
            snapshot.processed
        );
        progress.log_memory_usage();
        if snapshot.dropped_batches > 0 {
            error!(
                dropped_batches = snapshot.dropped_batches,
                dropped_documents = snapshot.dropped_documents,
                "{} batches ({} documents) could not be written and were dropped",
                snapshot.dropped_batches,
                snapshot.dropped_documents
            );
        }

        Ok(ImportSummary {
            processed: snapshot.processed,
            dropped_batches: snapshot.dropped_batches,
            dropped_documents: snapshot.dropped_documents,
            elapsed,
        })
    }
}

/// Parse the remaining lines of `source` into batches and queue them.
///
/// Returns the number of documents parsed.
async fn stream_batches(
    source: &mut LineSource,
    parser: &RecordParser,
    batch_size: usize,
    pool: &WorkerPool,
) -> Result<u64> {
    let mut accumulator = BatchAccumulator::new(batch_size);
    let mut parsed = 0u64;

    while let Some(line) = source.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(document) = parser.parse(line) else {
            continue;
        };
        accumulator.add(document);
        parsed += 1;

        if accumulator.is_full() {
            dispatch(pool, accumulator.drain_and_reset()).await?;
        }
    }

    if let Some(rest) = accumulator.finish() {
        dispatch(pool, rest).await?;
    }

    Ok(parsed)
}

async fn dispatch(pool: &WorkerPool, batch: Batch) -> Result<()> {
    tracing::trace!(sequence = batch.sequence, size = batch.len(), "Queueing batch");
    pool.submit(batch).await
}
