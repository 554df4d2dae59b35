//! Medical Terminology Importer
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Streams large delimited terminology files into a search index.
//!
//! # Overview
//!
//! - **Sources**: [`source::LineSource`] reads a local file or an object in
//!   S3-compatible storage line by line
//! - **Parsing**: [`parser::RecordParser`] maps a line to a
//!   [`mti_common::Document`] using the column layout of its document type
//! - **Batching**: [`batch::BatchAccumulator`] groups documents in source order
//! - **Submission**: [`worker::WorkerPool`] writes batches concurrently, with a
//!   fixed-delay retry per batch
//! - **Telemetry**: [`progress::ProgressTracker`] counts written documents and
//!   reports throughput and memory
//!
//! [`pipeline::Importer`] wires these together for one run.

pub mod batch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod index;
pub mod parser;
pub mod pipeline;
pub mod progress;
pub mod source;
pub mod storage;
pub mod worker;

// Re-export commonly used types
pub use cli::{Cli, Commands};
pub use config::{ImporterConfig, PipelineConfig};
pub use pipeline::{ImportRequest, ImportSummary, Importer};
