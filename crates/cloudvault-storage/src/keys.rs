//! Object key layout.
//!
//! Every key is `{tenant}/{bucket}/{folder or "root"}/{uuid}-{name}` so a
//! tenant's objects share one prefix and names never collide.

use cloudvault_core::types::{BucketId, FolderId, TenantId};
use uuid::Uuid;

pub use cloudvault_core::types::part::MAX_PART_NUMBER;

/// Longest file name kept in a key; longer names are truncated.
const MAX_NAME_LEN: usize = 200;

/// Prefix shared by every object of a bucket.
pub fn bucket_prefix(tenant_id: TenantId, bucket_id: BucketId) -> String {
    format!("{tenant_id}/{bucket_id}/")
}

/// Generate a fresh key for an upload.
pub fn upload_key(
    tenant_id: TenantId,
    bucket_id: BucketId,
    parent_id: Option<FolderId>,
    name: &str,
) -> String {
    let folder = parent_id.map_or_else(|| "root".to_string(), |id| id.to_string());
    format!(
        "{}{folder}/{}-{}",
        bucket_prefix(tenant_id, bucket_id),
        Uuid::new_v4(),
        sanitize_file_name(name)
    )
}

/// Replace path separators and control characters so a name is one key segment.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(MAX_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_key_layout() {
        let tenant = TenantId::new();
        let bucket = BucketId::new();
        let key = upload_key(tenant, bucket, None, "report.pdf");
        assert!(key.starts_with(&format!("{tenant}/{bucket}/root/")));
        assert!(key.ends_with("-report.pdf"));

        let folder = FolderId::new();
        let nested = upload_key(tenant, bucket, Some(folder), "a.txt");
        assert!(nested.starts_with(&format!("{tenant}/{bucket}/{folder}/")));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_file_name("a\\b\nc"), "a_b_c");
        assert_eq!(sanitize_file_name("   "), "file");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(&"x".repeat(500)).len(), MAX_NAME_LEN);
    }
}
