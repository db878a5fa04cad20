//! Object store configuration.

use serde::{Deserialize, Serialize};

/// Which object store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    /// In-process store, for development and tests.
    Memory,
    /// S3-compatible service (requires the `s3` feature).
    S3,
}

/// Top-level object store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Active provider.
    #[serde(default = "default_provider")]
    pub provider: StorageProvider,
    /// Lifetime of upload URLs (PUT and part PUT) in seconds.
    #[serde(default = "default_upload_ttl")]
    pub upload_url_ttl_seconds: u64,
    /// Lifetime of download URLs in seconds.
    #[serde(default = "default_download_ttl")]
    pub download_url_ttl_seconds: u64,
    /// Page size used when listing objects without an explicit limit.
    #[serde(default = "default_list_page_size")]
    pub list_page_size: i32,
    /// S3-compatible storage configuration.
    #[serde(default)]
    pub s3: S3StorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            upload_url_ttl_seconds: default_upload_ttl(),
            download_url_ttl_seconds: default_download_ttl(),
            list_page_size: default_list_page_size(),
            s3: S3StorageConfig::default(),
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct S3StorageConfig {
    /// Endpoint URL for non-AWS services such as MinIO; empty uses AWS.
    #[serde(default)]
    pub endpoint: String,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Physical bucket that holds every tenant's objects.
    #[serde(default)]
    pub bucket: String,
    /// Access key ID; empty falls back to the default credential chain.
    #[serde(default)]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
    /// Use path-style addressing.
    #[serde(default)]
    pub force_path_style: bool,
}

fn default_provider() -> StorageProvider {
    StorageProvider::Memory
}

fn default_upload_ttl() -> u64 {
    3600
}

fn default_download_ttl() -> u64 {
    300
}

fn default_list_page_size() -> i32 {
    1000
}

fn default_region() -> String {
    "us-east-1".to_string()
}
