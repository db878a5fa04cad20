//! Object and bucket events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to objects and buckets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FileEvent {
    /// A file finished uploading and its metadata was registered.
    Uploaded {
        /// The file ID.
        file_id: Uuid,
        /// The bucket containing the file.
        bucket_id: Uuid,
        /// Object key.
        key: String,
        /// The file name.
        name: String,
        /// The file size in bytes.
        size_bytes: i64,
        /// Whether the multipart protocol was used.
        multipart: bool,
    },
    /// A signed download URL was issued.
    DownloadSigned {
        /// The bucket containing the object.
        bucket_id: Uuid,
        /// Object key.
        key: String,
    },
    /// A file and its object were deleted.
    Deleted {
        /// The file ID.
        file_id: Uuid,
        /// Object key.
        key: String,
    },
    /// A multipart session was aborted.
    MultipartAborted {
        /// The bucket the session targeted.
        bucket_id: Uuid,
        /// Object key.
        key: String,
        /// Remote upload ID.
        upload_id: String,
    },
    /// A bucket was created.
    BucketCreated {
        /// The bucket ID.
        bucket_id: Uuid,
        /// Bucket display name.
        name: String,
    },
}

impl FileEvent {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Uploaded { .. } => "uploaded",
            Self::DownloadSigned { .. } => "download_signed",
            Self::Deleted { .. } => "deleted",
            Self::MultipartAborted { .. } => "multipart_aborted",
            Self::BucketCreated { .. } => "bucket_created",
        }
    }

    pub(crate) fn resource(&self) -> (&'static str, Uuid) {
        match self {
            Self::Uploaded { file_id, .. } | Self::Deleted { file_id, .. } => ("file", *file_id),
            Self::DownloadSigned { bucket_id, .. }
            | Self::MultipartAborted { bucket_id, .. }
            | Self::BucketCreated { bucket_id, .. } => ("bucket", *bucket_id),
        }
    }
}
