//! Shared domain types
//!
//! The tags accepted on the command line and the normalized document that
//! every parsed line turns into.

use crate::error::ImportError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Context
// ============================================================================

/// Terminology a run imports. Stamped on every document of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Context {
    /// SNOMED CT
    SnomedCt,
    /// ICD-10-GM (German modification)
    Icd10Gm,
}

impl Context {
    pub const ALL: [Context; 2] = [Context::SnomedCt, Context::Icd10Gm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Context::SnomedCt => "snomed-ct",
            Context::Icd10Gm => "icd-10-gm",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Context {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Context::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                ImportError::config(format!(
                    "Invalid context '{}', expected one of: snomed-ct, icd-10-gm",
                    s
                ))
            })
    }
}

// ============================================================================
// Document type
// ============================================================================

/// Layout of the source file. Selects the column map and the id rule, and
/// prefixes every document id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocType {
    /// SNOMED CT RF2 description file (`sct2_Description_*.txt`)
    SnomedCtDescription,
    /// ICD-10-GM code list (`icd10gm*_syst_kodes.txt`)
    Icd10GmCode,
}

impl DocType {
    pub const ALL: [DocType; 2] = [DocType::SnomedCtDescription, DocType::Icd10GmCode];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::SnomedCtDescription => "snomed-ct-description",
            DocType::Icd10GmCode => "icd-10-gm-code",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocType::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| {
                ImportError::config(format!(
                    "Invalid document type '{}', expected one of: snomed-ct-description, icd-10-gm-code",
                    s
                ))
            })
    }
}

// ============================================================================
// Document
// ============================================================================

/// Normalized record written to the search index.
///
/// `id` is the index primary key and is derived only from source fields and
/// the document type, so re-importing the same file overwrites rather than
/// duplicates. `metadata` holds every mapped column that was present in the
/// raw line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub code: String,
    pub display: String,
    pub context: String,
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        code: impl Into<String>,
        display: impl Into<String>,
        context: Context,
        metadata: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            display: display.into(),
            context: context.as_str().to_string(),
            metadata,
        }
    }
}
