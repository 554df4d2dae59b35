//! Medical Terminology Importer - common library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, error handling and logging for the importer workspace.
//!
//! # Overview
//!
//! - **Types**: the normalized [`Document`] pushed to the search index, plus
//!   the [`Context`] and [`DocType`] tags selected on the command line
//! - **Error Handling**: [`ImportError`] and the [`Result`] alias
//! - **Logging**: `tracing` subscriber setup driven by [`logging::LogConfig`]
//!
//! # Example
//!
//! ```
//! use mti_common::{Context, DocType, Document};
//! use std::collections::BTreeMap;
//!
//! let doc = Document::new(
//!     "icd-10-gm-code-A00",
//!     "A00",
//!     "Cholera",
//!     Context::Icd10Gm,
//!     BTreeMap::new(),
//! );
//! assert_eq!(doc.context, "icd-10-gm");
//! assert_eq!(DocType::Icd10GmCode.as_str(), "icd-10-gm-code");
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{ImportError, Result};
pub use types::{Context, DocType, Document};
