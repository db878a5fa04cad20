//! Registered file objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cloudvault_core::types::{BucketId, FileId, FolderId, TenantId, UserId};

use crate::permission::ResourceDescriptor;

/// Metadata for an object whose bytes finished uploading.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FileObject {
    /// File ID.
    pub id: FileId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Containing bucket.
    pub bucket_id: BucketId,
    /// Object key in the physical store.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// Parent folder, `None` for the bucket root.
    pub parent_id: Option<FolderId>,
    /// Uploader.
    pub owner_id: UserId,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl FileObject {
    /// Descriptor used for policy checks on this file.
    pub fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor::file(self.tenant_id, self.id)
    }

    /// Descriptor of the bucket the file inherits grants from.
    pub fn bucket_descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor::bucket(self.tenant_id, self.bucket_id)
    }
}

/// Data required to register a file.
#[derive(Debug, Clone)]
pub struct NewFileObject {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Containing bucket.
    pub bucket_id: BucketId,
    /// Object key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Parent folder.
    pub parent_id: Option<FolderId>,
    /// Uploader.
    pub owner_id: UserId,
}

impl NewFileObject {
    /// Build the stored record.
    pub fn into_file(self) -> FileObject {
        FileObject {
            id: FileId::new(),
            tenant_id: self.tenant_id,
            bucket_id: self.bucket_id,
            key: self.key,
            name: self.name,
            size: self.size,
            mime_type: self.mime_type,
            parent_id: self.parent_id,
            owner_id: self.owner_id,
            created_at: Utc::now(),
        }
    }
}
