use serde::{Deserialize, Serialize};

/// Default S3 region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Object storage connection settings
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Custom endpoint for S3-compatible stores (MinIO, GCS interop)
    pub endpoint: Option<String>,
    pub region: String,
    /// Bucket holding private terminology files
    pub bucket: Option<String>,
    /// Directory prefix joined in front of every object key
    pub key_prefix: Option<String>,
    /// Static credentials; when absent the default AWS provider chain is used
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub path_style: bool,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("key_prefix", &self.key_prefix)
            .field("access_key", &self.access_key.as_ref().map(|_| "***"))
            .field("path_style", &self.path_style)
            .finish()
    }
}

impl StorageConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            endpoint: lookup("S3_ENDPOINT"),
            region: lookup("S3_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            bucket: lookup("BUCKET_NAME_PRIVATE"),
            key_prefix: lookup("FILE_KEY_BASE_DIR"),
            access_key: lookup("S3_ACCESS_KEY").or_else(|| lookup("AWS_ACCESS_KEY_ID")),
            secret_key: lookup("S3_SECRET_KEY").or_else(|| lookup("AWS_SECRET_ACCESS_KEY")),
            path_style: lookup("S3_PATH_STYLE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Resolve the object key for a file path given on the command line.
    pub fn object_key(&self, file_path: &str) -> String {
        match self.key_prefix.as_deref().map(|p| p.trim_end_matches('/')) {
            Some(prefix) if !prefix.is_empty() => {
                format!("{}/{}", prefix, file_path.trim_start_matches('/'))
            }
            _ => file_path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorageConfig::from_lookup(lookup(&[]));
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.bucket, None);
        assert!(!config.path_style);
        assert!(config.access_key.is_none());
    }

    #[test]
    fn test_aws_credentials_fallback() {
        let config = StorageConfig::from_lookup(lookup(&[
            ("AWS_ACCESS_KEY_ID", "key"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("BUCKET_NAME_PRIVATE", "terminologies-private"),
            ("S3_PATH_STYLE", "true"),
        ]));
        assert_eq!(config.access_key.as_deref(), Some("key"));
        assert_eq!(config.secret_key.as_deref(), Some("secret"));
        assert_eq!(config.bucket.as_deref(), Some("terminologies-private"));
        assert!(config.path_style);
    }

    #[test]
    fn test_object_key_prefix() {
        let mut config = StorageConfig::default();
        assert_eq!(config.object_key("sct2_Description.txt"), "sct2_Description.txt");

        config.key_prefix = Some("snomed/2024/".to_string());
        assert_eq!(
            config.object_key("/sct2_Description.txt"),
            "snomed/2024/sct2_Description.txt"
        );
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = StorageConfig::from_lookup(lookup(&[
            ("S3_ENDPOINT", "http://localhost:9000"),
            ("S3_ACCESS_KEY", "terminology-reader"),
            ("S3_SECRET_KEY", "s3cr3t-value"),
        ]));
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("localhost:9000"));
        assert!(!rendered.contains("terminology-reader"));
        assert!(!rendered.contains("s3cr3t-value"));
    }
}
