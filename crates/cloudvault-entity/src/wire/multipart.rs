//! Multipart upload bodies.

use serde::{Deserialize, Serialize};
use validator::Validate;

use cloudvault_core::types::part::MAX_PART_NUMBER;
use cloudvault_core::types::{BucketId, CompletedPart, FolderId};

use super::not_blank;

/// `POST /api/multipart/initiate` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InitiateMultipartRequest {
    /// Target bucket.
    pub bucket_id: BucketId,
    /// File name.
    #[validate(length(max = 1024), custom(function = "not_blank"))]
    pub name: String,
    /// MIME type.
    #[serde(rename = "type", default)]
    pub content_type: Option<String>,
    /// Target folder.
    #[serde(default)]
    pub parent_id: Option<FolderId>,
}

/// `POST /api/multipart/initiate` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateMultipartResponse {
    /// Remote upload ID.
    pub upload_id: String,
    /// Object key the parts assemble into.
    pub key: String,
}

/// `POST /api/multipart/sign-part` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignPartRequest {
    /// Target bucket.
    pub bucket_id: BucketId,
    /// Object key.
    #[validate(length(min = 1))]
    pub key: String,
    /// Remote upload ID.
    #[validate(length(min = 1))]
    pub upload_id: String,
    /// 1-based part number.
    #[validate(range(min = 1, max = MAX_PART_NUMBER))]
    pub part_number: i32,
}

/// `POST /api/multipart/sign-part` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignPartResponse {
    /// Signed part URL.
    pub url: String,
}

/// `POST /api/multipart/complete` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteMultipartRequest {
    /// Target bucket.
    pub bucket_id: BucketId,
    /// Object key.
    #[validate(length(min = 1))]
    pub key: String,
    /// Remote upload ID.
    #[validate(length(min = 1))]
    pub upload_id: String,
    /// Uploaded parts, ascending by part number.
    #[validate(length(min = 1, max = 10_000))]
    pub parts: Vec<CompletedPart>,
    /// Display name.
    #[validate(length(max = 1024), custom(function = "not_blank"))]
    pub name: String,
    /// Total size in bytes.
    #[validate(range(min = 0))]
    pub size: i64,
    /// MIME type.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Parent folder.
    #[serde(default)]
    pub parent_id: Option<FolderId>,
}

/// `POST /api/multipart/abort` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AbortMultipartRequest {
    /// Target bucket.
    pub bucket_id: BucketId,
    /// Object key.
    #[validate(length(min = 1))]
    pub key: String,
    /// Remote upload ID.
    #[validate(length(min = 1))]
    pub upload_id: String,
}

/// `POST /api/multipart/abort` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbortMultipartResponse {
    /// Always `"aborted"`.
    pub status: String,
}
