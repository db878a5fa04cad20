//! Resource types and descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use cloudvault_core::types::TenantId;

/// Kind of resource an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resource_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// A logical bucket.
    Bucket,
    /// A single file object.
    File,
    /// A folder inside a bucket.
    Folder,
}

impl ResourceType {
    /// Return the type as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bucket => "bucket",
            Self::File => "file",
            Self::Folder => "folder",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The thing an action targets. Always tenant-scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// Tenant that owns the resource.
    pub tenant_id: TenantId,
    /// Kind of resource.
    pub resource_type: ResourceType,
    /// Resource ID.
    pub resource_id: Uuid,
}

impl ResourceDescriptor {
    /// Create a descriptor.
    pub fn new(tenant_id: TenantId, resource_type: ResourceType, resource_id: impl Into<Uuid>) -> Self {
        Self {
            tenant_id,
            resource_type,
            resource_id: resource_id.into(),
        }
    }

    /// Descriptor for a bucket.
    pub fn bucket(tenant_id: TenantId, bucket_id: impl Into<Uuid>) -> Self {
        Self::new(tenant_id, ResourceType::Bucket, bucket_id)
    }

    /// Descriptor for a file.
    pub fn file(tenant_id: TenantId, file_id: impl Into<Uuid>) -> Self {
        Self::new(tenant_id, ResourceType::File, file_id)
    }
}
