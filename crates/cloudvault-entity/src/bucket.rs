//! Logical buckets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cloudvault_core::types::{BucketId, TenantId, UserId};

use crate::permission::ResourceDescriptor;

/// A tenant-owned logical bucket. Its objects live under
/// `{tenant_id}/{bucket_id}/` in the physical object store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    /// Bucket ID.
    pub id: BucketId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Display name, unique per tenant.
    pub name: String,
    /// Creator.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Bucket {
    /// Key prefix every object of this bucket starts with.
    pub fn key_prefix(&self) -> String {
        format!("{}/{}/", self.tenant_id, self.id)
    }

    /// Whether `key` lies inside this bucket.
    ///
    /// Dots inside a segment are fine; a segment that is empty, `.` or `..`
    /// is not.
    pub fn owns_key(&self, key: &str) -> bool {
        key.strip_prefix(&self.key_prefix()).is_some_and(|rest| {
            rest.split('/')
                .all(|segment| !matches!(segment, "" | "." | ".."))
        })
    }

    /// Descriptor used for policy checks on this bucket.
    pub fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor::bucket(self.tenant_id, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owns_key_rejects_other_prefixes_and_traversal() {
        let bucket = Bucket {
            id: BucketId::new(),
            tenant_id: TenantId::new(),
            name: "media".to_string(),
            created_by: UserId::new(),
            created_at: Utc::now(),
        };
        let prefix = bucket.key_prefix();
        assert!(bucket.owns_key(&format!("{prefix}root/a.txt")));
        assert!(!bucket.owns_key("other/a.txt"));
        assert!(!bucket.owns_key(&format!("{prefix}../escape.txt")));
        assert!(!bucket.owns_key(&format!("{prefix}root/./a.txt")));
        assert!(!bucket.owns_key(&format!("{prefix}root//a.txt")));
        assert!(!bucket.owns_key(&prefix));
    }

    #[test]
    fn test_owns_key_accepts_dots_inside_names() {
        let bucket = Bucket {
            id: BucketId::new(),
            tenant_id: TenantId::new(),
            name: "media".to_string(),
            created_by: UserId::new(),
            created_at: Utc::now(),
        };
        let prefix = bucket.key_prefix();
        assert!(bucket.owns_key(&format!("{prefix}root/1234-report..v2.pdf")));
        assert!(bucket.owns_key(&format!("{prefix}root/1234-..tail")));
    }
}
