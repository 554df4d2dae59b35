//! Progress accounting and process telemetry
//!
//! Workers report finished and dropped batches here. Counters are atomics;
//! the only extra work on the hot path is a division to detect when the
//! running total crosses a logging boundary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::info;

/// Default number of documents between progress log lines.
pub const DEFAULT_LOG_INTERVAL: u64 = 100_000;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Resident memory of the current process, sampled on demand.
pub struct MemoryProbe {
    system: Mutex<System>,
    pid: Option<Pid>,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    /// Resident set size in bytes, `None` if the platform can't report it.
    pub fn resident_bytes(&self) -> Option<u64> {
        let pid = self.pid?;
        let mut system = self.system.lock().ok()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            ProcessRefreshKind::new().with_memory(),
        );
        system.process(pid).map(|p| p.memory())
    }

    pub fn resident_mb(&self) -> Option<f64> {
        self.resident_bytes().map(|b| b as f64 / BYTES_PER_MB)
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub processed: u64,
    pub dropped_batches: u64,
    pub dropped_documents: u64,
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Documents per second since the tracker was created
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.processed as f64 / secs
        } else {
            0.0
        }
    }
}

pub struct ProgressTracker {
    processed: AtomicU64,
    dropped_batches: AtomicU64,
    dropped_documents: AtomicU64,
    log_interval: u64,
    started: Instant,
    memory: MemoryProbe,
}

impl ProgressTracker {
    pub fn new(log_interval: u64) -> Self {
        Self {
            processed: AtomicU64::new(0),
            dropped_batches: AtomicU64::new(0),
            dropped_documents: AtomicU64::new(0),
            log_interval: log_interval.max(1),
            started: Instant::now(),
            memory: MemoryProbe::new(),
        }
    }

    /// Add a successfully written batch and return the new total.
    ///
    /// Logs throughput and memory when the total crosses a multiple of the
    /// log interval.
    pub fn record_processed(&self, batch_size: u64) -> u64 {
        let previous = self.processed.fetch_add(batch_size, Ordering::AcqRel);
        let total = previous + batch_size;

        if crosses_interval(previous, total, self.log_interval) {
            let elapsed = self.started.elapsed().as_secs_f64();
            let rate = if elapsed > 0.0 { total as f64 / elapsed } else { 0.0 };
            info!(
                batch_size,
                total,
                rate = %format!("{:.0}/s", rate),
                "Processed batch of {} records. Total: {}",
                batch_size,
                total
            );
            self.log_memory_usage();
        }

        total
    }

    /// Account for a batch abandoned after exhausting its retries.
    pub fn record_dropped(&self, batch_size: u64) {
        self.dropped_batches.fetch_add(1, Ordering::AcqRel);
        self.dropped_documents.fetch_add(batch_size, Ordering::AcqRel);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            processed: self.processed.load(Ordering::Acquire),
            dropped_batches: self.dropped_batches.load(Ordering::Acquire),
            dropped_documents: self.dropped_documents.load(Ordering::Acquire),
            elapsed: self.started.elapsed(),
        }
    }

    pub fn log_memory_usage(&self) {
        match self.memory.resident_mb() {
            Some(mb) => info!(memory_mb = %format!("{:.2}", mb), "Current memory usage: {:.2} MB", mb),
            None => info!("Current memory usage: unavailable"),
        }
    }
}

/// True when `previous..=total` passes a multiple of `interval`.
fn crosses_interval(previous: u64, total: u64, interval: u64) -> bool {
    previous / interval != total / interval
}
