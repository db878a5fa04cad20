//! Client-side transfer job snapshots.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudvault_core::types::{BucketId, CompletedPart, FolderId, JobId};

use crate::file::FileObject;

/// Which way bytes move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    /// Local bytes to the object store.
    Upload,
    /// Object store bytes to a local path.
    Download,
}

/// Lifecycle of a transfer job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Queued behind the active job.
    Pending,
    /// Bytes are moving.
    Uploading,
    /// Finished and registered.
    Complete,
    /// Failed; any remote session was aborted.
    Error,
    /// Cancelled by the caller.
    Aborted,
}

impl TransferStatus {
    /// Whether the job has left the queue for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error | Self::Aborted)
    }
}

/// Where a job's bytes go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TransferDestination {
    /// A bucket, optionally inside a folder.
    #[serde(rename_all = "camelCase")]
    Bucket {
        /// Target bucket.
        bucket_id: BucketId,
        /// Target folder.
        parent_id: Option<FolderId>,
        /// File name to register.
        name: String,
    },
    /// A path on the local filesystem.
    #[serde(rename_all = "camelCase")]
    LocalPath {
        /// Output path.
        path: PathBuf,
    },
}

/// Observable state of one queued transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferJob {
    /// Job ID.
    pub id: JobId,
    /// Direction.
    pub direction: TransferDirection,
    /// Local path for uploads, object key for downloads.
    pub source_ref: String,
    /// Destination.
    pub destination: TransferDestination,
    /// Total bytes to move.
    pub total_size: u64,
    /// Current status.
    pub status: TransferStatus,
    /// Object key once the server assigned one.
    pub key: Option<String>,
    /// Parts acknowledged so far, sorted by part number once complete.
    pub parts: Vec<CompletedPart>,
    /// Rounded completion percentage.
    pub progress_percent: u8,
    /// Failure description when `status` is `Error`.
    pub error: Option<String>,
    /// Registered file after a successful upload.
    pub file: Option<FileObject>,
    /// Enqueue time.
    pub created_at: DateTime<Utc>,
    /// Time the job reached a terminal status.
    pub finished_at: Option<DateTime<Utc>>,
}

impl TransferJob {
    /// Create a pending job.
    pub fn pending(
        direction: TransferDirection,
        source_ref: impl Into<String>,
        destination: TransferDestination,
        total_size: u64,
    ) -> Self {
        Self {
            id: JobId::new(),
            direction,
            source_ref: source_ref.into(),
            destination,
            total_size,
            status: TransferStatus::Pending,
            key: None,
            parts: Vec::new(),
            progress_percent: 0,
            error: None,
            file: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }
}
