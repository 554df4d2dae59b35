//! Line sources
//!
//! A [`LineSource`] owns the open handle of either a local file or a remote
//! object and hands out UTF-8 lines one at a time. The handle is released
//! when the source is dropped, whether iteration finished, stopped early, or
//! failed.

use clap::ValueEnum;
use mti_common::{ImportError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::debug;

use crate::storage::{ObjectReader, ObjectStore};

mod local;
mod remote;

/// Where the terminology file lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Local,
    Bucket,
}

impl std::str::FromStr for SourceKind {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "local" => Ok(SourceKind::Local),
            "bucket" => Ok(SourceKind::Bucket),
            _ => Err(ImportError::config(format!(
                "Invalid source type '{}', expected local or bucket",
                s
            ))),
        }
    }
}

/// Resolved location of one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Local(PathBuf),
    Remote { bucket: String, key: String },
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Local(path) => write!(f, "{}", path.display()),
            SourceSpec::Remote { bucket, key } => write!(f, "s3://{}/{}", bucket, key),
        }
    }
}

/// Lazy, single-pass sequence of lines over an open source.
pub struct LineSource {
    lines: Lines<BufReader<ObjectReader>>,
    origin: String,
    lines_read: u64,
}

impl LineSource {
    /// Open `spec`. Remote sources need an object store.
    pub async fn open(spec: &SourceSpec, store: Option<&dyn ObjectStore>) -> Result<Self> {
        let reader = match spec {
            SourceSpec::Local(path) => local::open(path).await?,
            SourceSpec::Remote { bucket, key } => {
                let store = store.ok_or_else(|| {
                    ImportError::config("Bucket source requested but no object storage is configured")
                })?;
                remote::open(store, bucket, key).await?
            }
        };

        debug!(source = %spec, "Source opened");
        Ok(Self::from_reader(reader, spec.to_string()))
    }

    pub fn from_reader(reader: ObjectReader, origin: impl Into<String>) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            origin: origin.into(),
            lines_read: 0,
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Next line without its terminator, `None` at end of input.
    ///
    /// Invalid UTF-8 surfaces as an [`ImportError::Io`] and ends the run.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        let line = self.lines.next_line().await?;
        if line.is_some() {
            self.lines_read += 1;
        }
        Ok(line)
    }

    /// Consume the header row. An empty source is an error.
    pub async fn skip_header(&mut self) -> Result<()> {
        match self.next_line().await? {
            Some(header) => {
                debug!(header = %header, "Skipped header row");
                Ok(())
            }
            None => Err(ImportError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("error reading header: {} is empty", self.origin),
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn source_from(bytes: &'static [u8]) -> LineSource {
        LineSource::from_reader(Box::pin(bytes), "memory")
    }

    #[tokio::test]
    async fn test_lines_are_yielded_in_order() {
        let mut source = source_from(b"first\nsecond\r\nthird");

        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("first"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("third"));
        assert_eq!(source.next_line().await.unwrap(), None);
        assert_eq!(source.lines_read(), 3);
    }

    #[tokio::test]
    async fn test_skip_header() {
        let mut source = source_from(b"id\tterm\n1\tCholera\n");
        source.skip_header().await.unwrap();
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("1\tCholera"));
    }

    #[tokio::test]
    async fn test_skip_header_on_empty_source_fails() {
        let mut source = source_from(b"");
        let err = source.skip_header().await.unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_an_error() {
        let mut source = source_from(b"ok\n\xff\xfe\n");
        assert!(source.next_line().await.unwrap().is_some());
        assert!(source.next_line().await.is_err());
    }

    #[tokio::test]
    async fn test_open_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a;b;c").unwrap();

        let spec = SourceSpec::Local(file.path().to_path_buf());
        let mut source = LineSource::open(&spec, None).await.unwrap();
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("a;b;c"));
    }

    #[tokio::test]
    async fn test_open_missing_local_file() {
        let spec = SourceSpec::Local(PathBuf::from("/nonexistent/sct2_Description.txt"));
        let err = LineSource::open(&spec, None).await.err().unwrap();
        assert!(matches!(err, ImportError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_bucket_source_without_store() {
        let spec = SourceSpec::Remote {
            bucket: "private".to_string(),
            key: "icd10gm.txt".to_string(),
        };
        let err = LineSource::open(&spec, None).await.err().unwrap();
        assert!(matches!(err, ImportError::Config(_)));
    }

    /// Serves fixed contents for a single bucket/key
    struct MemoryStore {
        bucket: &'static str,
        key: &'static str,
        contents: &'static [u8],
    }

    #[async_trait::async_trait]
    impl ObjectStore for MemoryStore {
        async fn open_read_stream(&self, bucket: &str, key: &str) -> Result<ObjectReader> {
            if bucket == self.bucket && key == self.key {
                Ok(Box::pin(self.contents))
            } else {
                Err(ImportError::not_found(format!("s3://{}/{}", bucket, key)))
            }
        }
    }

    #[tokio::test]
    async fn test_open_remote_object() {
        let store = MemoryStore {
            bucket: "private",
            key: "terminologies/icd10gm.txt",
            contents: b"header\n1;A00\n",
        };
        let spec = SourceSpec::Remote {
            bucket: "private".to_string(),
            key: "terminologies/icd10gm.txt".to_string(),
        };

        let mut source = LineSource::open(&spec, Some(&store as &dyn ObjectStore)).await.unwrap();
        assert_eq!(source.origin(), "s3://private/terminologies/icd10gm.txt");
        source.skip_header().await.unwrap();
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("1;A00"));
    }

    #[tokio::test]
    async fn test_open_missing_remote_object() {
        let store = MemoryStore {
            bucket: "private",
            key: "icd10gm.txt",
            contents: b"",
        };
        let spec = SourceSpec::Remote {
            bucket: "private".to_string(),
            key: "other.txt".to_string(),
        };

        let err = LineSource::open(&spec, Some(&store as &dyn ObjectStore)).await.err().unwrap();
        assert!(matches!(err, ImportError::NotFound(_)));
    }

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("local".parse::<SourceKind>().unwrap(), SourceKind::Local);
        assert_eq!("BUCKET".parse::<SourceKind>().unwrap(), SourceKind::Bucket);
        assert!("ftp".parse::<SourceKind>().is_err());
    }
}
