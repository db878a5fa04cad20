//! Presign, registration, and listing bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use cloudvault_core::types::{BucketId, FolderId};

use super::not_blank;
use crate::file::FileObject;

/// Operation a presigned URL is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresignAction {
    /// Signed PUT.
    Upload,
    /// Signed GET served as an attachment.
    Download,
    /// Signed GET served inline.
    Read,
}

/// `POST /api/presign` body.
///
/// Uploads name the object with `name` (plus optional `parentId`);
/// downloads and reads address an existing `key`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    /// Target bucket.
    pub bucket_id: BucketId,
    /// Requested operation.
    pub action: PresignAction,
    /// Existing object key.
    #[serde(default)]
    pub key: Option<String>,
    /// File name for uploads.
    #[serde(default)]
    #[validate(length(max = 1024), custom(function = "not_blank"))]
    pub name: Option<String>,
    /// Folder for uploads.
    #[serde(default)]
    pub parent_id: Option<FolderId>,
    /// MIME type for uploads.
    #[serde(default)]
    pub content_type: Option<String>,
}

/// `POST /api/presign` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    /// Signed URL.
    pub url: String,
    /// Object key the URL addresses.
    pub key: String,
    /// When the URL stops working.
    pub expires_at: DateTime<Utc>,
}

/// `POST /api/files/register` body, sent after a single-shot PUT.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFileRequest {
    /// Bucket the object was written to.
    pub bucket_id: BucketId,
    /// Object key from the presign response.
    #[validate(length(min = 1))]
    pub key: String,
    /// Display name.
    #[validate(length(max = 1024), custom(function = "not_blank"))]
    pub name: String,
    /// Size in bytes.
    #[validate(range(min = 0))]
    pub size: i64,
    /// MIME type.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Parent folder.
    #[serde(default)]
    pub parent_id: Option<FolderId>,
}

/// Response carrying a registered file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResponse {
    /// The registered file.
    pub file: FileObject,
}

/// `POST /api/buckets` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBucketRequest {
    /// Display name.
    pub name: String,
}

/// Query string for `GET /api/buckets/{id}/objects`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListObjectsQuery {
    /// Token from the previous page.
    #[serde(default)]
    pub continuation_token: Option<String>,
    /// Page size.
    #[serde(default)]
    pub max_keys: Option<i32>,
}
