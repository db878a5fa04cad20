//! Buckets, object listing, and file deletion.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use cloudvault_auth::PolicyGuard;
use cloudvault_core::config::StorageConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::events::{EventPayload, FileEvent};
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::{ObjectPage, ObjectStore};
use cloudvault_core::types::{BucketId, FileId};
use cloudvault_database::{BucketStore, FileStore};
use cloudvault_entity::bucket::Bucket;
use cloudvault_entity::file::FileObject;
use cloudvault_entity::permission::Action;
use cloudvault_entity::wire::ListObjectsQuery;

use super::{file_resources, load_bucket};
use crate::audit::AuditRecorder;
use crate::context::RequestContext;

const MAX_BUCKET_NAME_LEN: usize = 63;

/// Bucket and file management.
#[derive(Debug, Clone)]
pub struct FileService {
    buckets: Arc<dyn BucketStore>,
    files: Arc<dyn FileStore>,
    objects: Arc<dyn ObjectStore>,
    guard: PolicyGuard,
    audit: AuditRecorder,
    config: StorageConfig,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        buckets: Arc<dyn BucketStore>,
        files: Arc<dyn FileStore>,
        objects: Arc<dyn ObjectStore>,
        audit: AuditRecorder,
        config: StorageConfig,
    ) -> Self {
        Self {
            buckets,
            files,
            objects,
            guard: PolicyGuard::new(),
            audit,
            config,
        }
    }

    /// Create a bucket in the caller's tenant. Requires `CREATE_BUCKET`.
    pub async fn create_bucket(&self, ctx: &RequestContext, name: &str) -> AppResult<Bucket> {
        let name = name.trim();
        validate_bucket_name(name)?;

        let bucket = Bucket {
            id: BucketId::new(),
            tenant_id: ctx.tenant_id(),
            name: name.to_string(),
            created_by: ctx.user_id(),
            created_at: Utc::now(),
        };
        self.guard
            .require(&ctx.principal, Action::CreateBucket, &bucket.descriptor())?;

        let bucket = self.buckets.insert(&bucket).await?;

        info!(bucket_id = %bucket.id, name = %bucket.name, "Bucket created");
        self.audit
            .record(ctx.event(EventPayload::File(FileEvent::BucketCreated {
                bucket_id: bucket.id.into_uuid(),
                name: bucket.name.clone(),
            })))
            .await;
        Ok(bucket)
    }

    /// Buckets of the caller's tenant that it may list.
    pub async fn list_buckets(&self, ctx: &RequestContext) -> AppResult<Vec<Bucket>> {
        let engine = self.guard.engine();
        Ok(self
            .buckets
            .list_by_tenant(ctx.tenant_id())
            .await?
            .into_iter()
            .filter(|b| engine.evaluate(&ctx.principal, Action::List, &b.descriptor()))
            .collect())
    }

    /// One page of the objects stored in a bucket. Requires `LIST`.
    pub async fn list_objects(
        &self,
        ctx: &RequestContext,
        bucket_id: BucketId,
        query: ListObjectsQuery,
    ) -> AppResult<ObjectPage> {
        let bucket = load_bucket(self.buckets.as_ref(), bucket_id).await?;
        self.guard
            .require(&ctx.principal, Action::List, &bucket.descriptor())?;

        let max_keys = query
            .max_keys
            .unwrap_or(self.config.list_page_size)
            .clamp(1, self.config.list_page_size.max(1));
        self.objects
            .list_objects(
                &bucket.key_prefix(),
                query.continuation_token.as_deref(),
                max_keys,
            )
            .await
    }

    /// Load a file the caller may perform `action` on.
    pub async fn authorized_file(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        action: Action,
    ) -> AppResult<FileObject> {
        let file = self
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        self.guard
            .require_any(&ctx.principal, action, &file_resources(&file))?;
        Ok(file)
    }

    /// Delete the object, then its metadata. Requires `DELETE`.
    pub async fn delete_file(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<()> {
        let file = self.authorized_file(ctx, file_id, Action::Delete).await?;

        self.objects.delete_object(&file.key).await?;
        self.files.delete(file.id).await?;

        info!(file_id = %file.id, key = %file.key, "File deleted");
        self.audit
            .record(ctx.event(EventPayload::File(FileEvent::Deleted {
                file_id: file.id.into_uuid(),
                key: file.key.clone(),
            })))
            .await;
        Ok(())
    }
}

fn validate_bucket_name(name: &str) -> AppResult<()> {
    if name.is_empty() || name.len() > MAX_BUCKET_NAME_LEN {
        return Err(AppError::validation(format!(
            "Bucket name must be 1 to {MAX_BUCKET_NAME_LEN} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(AppError::validation(
            "Bucket name may only contain letters, digits, '-', '_' and '.'",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use cloudvault_core::error::ErrorKind;
    use cloudvault_core::types::TenantId;
    use cloudvault_entity::principal::Role;

    use super::*;
    use crate::test_support::{Harness, grant_bucket};

    #[tokio::test]
    async fn test_create_bucket_requires_permission() {
        let h = Harness::new();
        let tenant = TenantId::new();
        let user = h.user(tenant, Role::Teammate).await;
        let ctx = h.context(&user).await;
        let err = h.files.create_bucket(&ctx, "reports").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        grant_bucket(&h.store, &user, None, &[Action::CreateBucket]).await;
        let ctx = h.context(&user).await;
        let bucket = h.files.create_bucket(&ctx, "reports").await.unwrap();
        assert_eq!(bucket.tenant_id, tenant);

        let err = h.files.create_bucket(&ctx, "reports").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        let err = h.files.create_bucket(&ctx, "bad/name").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_list_objects_pages_within_bucket() {
        let h = Harness::new();
        let tenant = TenantId::new();
        let bucket = h.bucket(tenant).await;
        let other = h.bucket(tenant).await;
        let user = h.user(tenant, Role::Teammate).await;
        grant_bucket(&h.store, &user, Some(bucket.id), &[Action::List]).await;
        let ctx = h.context(&user).await;

        for name in ["a", "b", "c"] {
            h.objects
                .insert_object(&format!("{}root/{name}", bucket.key_prefix()), Bytes::new())
                .await;
        }
        h.objects
            .insert_object(&format!("{}root/z", other.key_prefix()), Bytes::new())
            .await;

        let first = h
            .files
            .list_objects(
                &ctx,
                bucket.id,
                ListObjectsQuery {
                    continuation_token: None,
                    max_keys: Some(2),
                },
            )
            .await
            .unwrap();
        assert_eq!(first.objects.len(), 2);
        let second = h
            .files
            .list_objects(
                &ctx,
                bucket.id,
                ListObjectsQuery {
                    continuation_token: first.next_continuation_token,
                    max_keys: Some(2),
                },
            )
            .await
            .unwrap();
        assert_eq!(second.objects.len(), 1);
        assert!(second.next_continuation_token.is_none());

        let err = h
            .files
            .list_objects(&ctx, other.id, ListObjectsQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_delete_file_through_bucket_grant() {
        let h = Harness::new();
        let tenant = TenantId::new();
        let bucket = h.bucket(tenant).await;
        let owner = h.user(tenant, Role::TenantAdmin).await;
        let file = h.file(&bucket, &owner, "old.txt").await;
        let user = h.user(tenant, Role::Teammate).await;
        grant_bucket(&h.store, &user, Some(bucket.id), &[Action::Delete]).await;
        let ctx = h.context(&user).await;

        h.files.delete_file(&ctx, file.id).await.unwrap();
        assert!(h.objects.object_bytes(&file.key).await.is_none());
        let err = h.files.delete_file(&ctx, file.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
