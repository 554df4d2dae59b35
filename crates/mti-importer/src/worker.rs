//! Submission worker pool
//!
//! A fixed set of tokio tasks pulls owned [`Batch`] values from a bounded
//! channel and writes each one to the index. A failing batch is retried as a
//! whole after a fixed delay; once the attempts are used up it is logged and
//! dropped so the rest of the import can continue.
//!
//! Batches complete in whatever order the workers finish them. Only the
//! document order inside a single batch is preserved.

use mti_common::{ImportError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, warn, Instrument};

use crate::batch::Batch;
use crate::index::IndexClient;
use crate::progress::ProgressTracker;

/// Default number of concurrent submission workers.
pub const DEFAULT_WORKERS: usize = 5;

/// Default number of attempts per batch, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between two attempts of the same batch.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(300);

/// Fixed-delay retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub workers: usize,
    /// Capacity of the batch channel; a full channel blocks the reader
    pub queue_capacity: usize,
    pub index_name: String,
    pub retry: RetryPolicy,
}

/// Outcome of sending one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered { attempts: u32 },
    Dropped { attempts: u32 },
}

/// Send `batch` until it succeeds or the policy's attempts are used up.
///
/// Logs one warning per failed attempt that will be retried and exactly one
/// error if the batch is dropped.
pub async fn deliver_batch(
    client: &dyn IndexClient,
    index: &str,
    batch: &Batch,
    policy: RetryPolicy,
) -> Delivery {
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match client.add_documents(index, &batch.documents).await {
            Ok(()) => {
                debug!(attempt, documents = batch.len(), "Batch delivered");
                return Delivery::Delivered { attempts: attempt };
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    error = %e,
                    attempt,
                    max_attempts,
                    "Retry {}/{}: {}",
                    attempt,
                    max_attempts,
                    e
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => {
                let (first_id, last_id) = batch.id_range().unwrap_or(("", ""));
                error!(
                    error = %e,
                    documents = batch.len(),
                    first_id,
                    last_id,
                    "Failed to add batch after {} retries: {}",
                    max_attempts,
                    e
                );
            }
        }
    }

    Delivery::Dropped {
        attempts: max_attempts,
    }
}

pub struct WorkerPool {
    sender: mpsc::Sender<Batch>,
    workers: JoinSet<()>,
}

impl WorkerPool {
    pub fn spawn(
        config: WorkerConfig,
        client: Arc<dyn IndexClient>,
        progress: Arc<ProgressTracker>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel::<Batch>(config.queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let index_name: Arc<str> = Arc::from(config.index_name.as_str());

        let mut workers = JoinSet::new();
        for worker_id in 0..config.workers.max(1) {
            let receiver = Arc::clone(&receiver);
            let client = Arc::clone(&client);
            let progress = Arc::clone(&progress);
            let index_name = Arc::clone(&index_name);
            let policy = config.retry;

            let span = tracing::debug_span!("submission_worker", worker_id);
            workers.spawn(
                async move {
                    loop {
                        let next = receiver.lock().await.recv().await;
                        let Some(batch) = next else { break };

                        let size = batch.len() as u64;
                        let span = tracing::debug_span!("batch", sequence = batch.sequence, size);
                        match deliver_batch(client.as_ref(), &index_name, &batch, policy)
                            .instrument(span)
                            .await
                        {
                            Delivery::Delivered { .. } => {
                                progress.record_processed(size);
                            }
                            Delivery::Dropped { .. } => progress.record_dropped(size),
                        }
                    }
                    debug!("Worker finished");
                }
                .instrument(span),
            );
        }

        Self { sender, workers }
    }

    /// Queue a batch, waiting while the channel is full.
    pub async fn submit(&self, batch: Batch) -> Result<()> {
        self.sender.send(batch).await.map_err(|_| {
            ImportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "submission workers have stopped",
            ))
        })
    }

    /// Close the queue and wait for every queued batch to be handled.
    pub async fn shutdown(self) {
        let Self {
            sender,
            mut workers,
        } = self;
        drop(sender);

        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "Submission worker terminated abnormally");
            }
        }
    }
}
