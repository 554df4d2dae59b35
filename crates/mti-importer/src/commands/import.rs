//! `mti-importer import` command implementation

use anyhow::Context as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::cli::ImportArgs;
use crate::config::ImporterConfig;
use crate::index::{IndexClient, MeiliClient};
use crate::pipeline::{ImportRequest, ImportSummary, Importer};
use crate::source::{SourceKind, SourceSpec};
use crate::storage::{ObjectStore, S3Storage};

/// Run one import with the settings in `config`.
pub async fn run(args: ImportArgs, config: &ImporterConfig) -> anyhow::Result<ImportSummary> {
    let source_kind = args.source_type.unwrap_or(config.default_source);

    let (source, store) = match source_kind {
        SourceKind::Local => (SourceSpec::Local(PathBuf::from(&args.file_path)), None),
        SourceKind::Bucket => {
            let bucket = config
                .storage
                .bucket
                .clone()
                .context("BUCKET_NAME_PRIVATE must be set for bucket sources")?;
            let key = config.storage.object_key(&args.file_path);
            let store: Arc<dyn ObjectStore> = Arc::new(S3Storage::new(&config.storage).await);
            (SourceSpec::Remote { bucket, key }, Some(store))
        }
    };

    let index: Arc<dyn IndexClient> =
        Arc::new(MeiliClient::new(&config.meili).context("Failed to create index client")?);

    info!(
        context = %args.context,
        doc_type = %args.doc_type,
        source = %source,
        host = %config.meili.host,
        "Importing {} into index '{}'",
        source,
        config.pipeline.index_name
    );

    let request = ImportRequest {
        context: args.context,
        doc_type: args.doc_type,
        source,
        has_header: args.has_header,
        delimiter: args.delimiter,
    };

    let importer = Importer::new(index, store, config.pipeline.clone());
    let summary = importer
        .run(request)
        .await
        .with_context(|| format!("Import of '{}' failed", args.file_path))?;

    Ok(summary)
}
