//! Object store trait for S3-compatible backends.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::CompletedPart;

/// A time-limited URL granting direct access for a single operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignedUrl {
    /// The signed URL.
    pub url: String,
    /// When the signature stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Metadata about a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Full object key.
    pub key: String,
    /// Size in bytes.
    pub size: i64,
    /// Object ETag without quotes, when reported.
    pub etag: Option<String>,
    /// Last modified timestamp.
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of a prefix listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPage {
    /// Objects on this page, ordered by key.
    pub objects: Vec<ObjectInfo>,
    /// Token to pass back for the next page; `None` on the last page.
    pub next_continuation_token: Option<String>,
}

/// Operations CloudVault consumes from an S3-compatible object store.
///
/// Byte transfer never goes through this trait: clients PUT and GET
/// directly against the presigned URLs it hands out.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Provider name for logs (e.g. `"memory"`, `"s3"`).
    fn provider_type(&self) -> &str;

    /// Open a multipart session and return its upload ID.
    async fn create_multipart_upload(
        &self,
        key: &str,
        content_type: Option<&str>,
    ) -> AppResult<String>;

    /// Sign a PUT for one part of an open multipart session.
    async fn presign_upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        expires_in: Duration,
    ) -> AppResult<PresignedUrl>;

    /// Stitch the uploaded parts into the final object. `parts` must be
    /// sorted ascending by part number.
    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> AppResult<()>;

    /// Abort a multipart session and release the parts stored so far.
    async fn abort_multipart_upload(&self, key: &str, upload_id: &str) -> AppResult<()>;

    /// Sign a single-shot PUT.
    async fn presign_put(
        &self,
        key: &str,
        content_type: Option<&str>,
        expires_in: Duration,
    ) -> AppResult<PresignedUrl>;

    /// Sign a GET. `download_name` sets the attachment file name.
    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
        download_name: Option<&str>,
    ) -> AppResult<PresignedUrl>;

    /// Fetch object metadata; `None` when the key does not exist.
    async fn head_object(&self, key: &str) -> AppResult<Option<ObjectInfo>>;

    /// Delete an object. Deleting a missing key succeeds.
    async fn delete_object(&self, key: &str) -> AppResult<()>;

    /// List objects under `prefix`, one page at a time.
    async fn list_objects(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
        max_keys: i32,
    ) -> AppResult<ObjectPage>;
}
