//! Multipart upload sessions.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use validator::Validate;

use cloudvault_auth::PolicyGuard;
use cloudvault_core::config::StorageConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::events::{EventPayload, FileEvent};
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::ObjectStore;
use cloudvault_core::types::part::strip_etag_quotes;
use cloudvault_core::types::{BucketId, CompletedPart};
use cloudvault_database::{BucketStore, FileStore};
use cloudvault_entity::bucket::Bucket;
use cloudvault_entity::file::{FileObject, NewFileObject};
use cloudvault_entity::permission::Action;
use cloudvault_entity::wire::{
    AbortMultipartRequest, AbortMultipartResponse, CompleteMultipartRequest,
    InitiateMultipartRequest, InitiateMultipartResponse, SignPartRequest, SignPartResponse,
};
use cloudvault_storage::keys::{self, MAX_PART_NUMBER};

use super::{ensure_key_in_bucket, load_bucket};
use crate::audit::AuditRecorder;
use crate::context::RequestContext;

/// Drives the remote multipart protocol on behalf of clients.
///
/// Every step requires `UPLOAD` on the bucket.
#[derive(Debug, Clone)]
pub struct MultipartService {
    buckets: Arc<dyn BucketStore>,
    files: Arc<dyn FileStore>,
    objects: Arc<dyn ObjectStore>,
    guard: PolicyGuard,
    audit: AuditRecorder,
    config: StorageConfig,
}

impl MultipartService {
    /// Creates a new multipart service.
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

    async fn authorize(&self, ctx: &RequestContext, bucket_id: BucketId) -> AppResult<Bucket> {
        let bucket = load_bucket(self.buckets.as_ref(), bucket_id).await?;
        self.guard
            .require(&ctx.principal, Action::Upload, &bucket.descriptor())?;
        Ok(bucket)
    }

    /// Open a multipart session under a freshly derived key.
    pub async fn initiate(
        &self,
        ctx: &RequestContext,
        req: InitiateMultipartRequest,
    ) -> AppResult<InitiateMultipartResponse> {
        req.validate()?;
        let bucket = self.authorize(ctx, req.bucket_id).await?;

        let key = keys::upload_key(bucket.tenant_id, bucket.id, req.parent_id, req.name.trim());
        let upload_id = self
            .objects
            .create_multipart_upload(&key, req.content_type.as_deref())
            .await?;

        info!(bucket_id = %bucket.id, key = %key, upload_id = %upload_id, "Multipart upload initiated");
        Ok(InitiateMultipartResponse { upload_id, key })
    }

    /// Sign the PUT for one part.
    pub async fn sign_part(
        &self,
        ctx: &RequestContext,
        req: SignPartRequest,
    ) -> AppResult<SignPartResponse> {
        req.validate()?;
        let bucket = self.authorize(ctx, req.bucket_id).await?;
        ensure_key_in_bucket(&bucket, &req.key)?;

        let signed = self
            .objects
            .presign_upload_part(
                &req.key,
                &req.upload_id,
                req.part_number,
                Duration::from_secs(self.config.upload_url_ttl_seconds),
            )
            .await?;
        debug!(upload_id = %req.upload_id, part_number = req.part_number, "Part URL signed");
        Ok(SignPartResponse { url: signed.url })
    }

    /// Finalize the session and register the resulting file.
    pub async fn complete(
        &self,
        ctx: &RequestContext,
        req: CompleteMultipartRequest,
    ) -> AppResult<FileObject> {
        req.validate()?;
        let bucket = self.authorize(ctx, req.bucket_id).await?;
        ensure_key_in_bucket(&bucket, &req.key)?;
        validate_parts(&req.parts)?;
        let name = req.name.trim();

        self.objects
            .complete_multipart_upload(&req.key, &req.upload_id, &req.parts)
            .await?;

        let file = self
            .files
            .insert(
                &NewFileObject {
                    tenant_id: bucket.tenant_id,
                    bucket_id: bucket.id,
                    key: req.key,
                    name: name.to_string(),
                    size: req.size,
                    mime_type: req.mime_type,
                    parent_id: req.parent_id,
                    owner_id: ctx.user_id(),
                }
                .into_file(),
            )
            .await?;

        info!(
            file_id = %file.id,
            upload_id = %req.upload_id,
            parts = req.parts.len(),
            size = file.size,
            "Multipart upload completed"
        );
        self.audit
            .record(ctx.event(EventPayload::File(FileEvent::Uploaded {
                file_id: file.id.into_uuid(),
                bucket_id: file.bucket_id.into_uuid(),
                key: file.key.clone(),
                name: file.name.clone(),
                size_bytes: file.size,
                multipart: true,
            })))
            .await;
        Ok(file)
    }

    /// Discard the session and every uploaded part.
    pub async fn abort(
        &self,
        ctx: &RequestContext,
        req: AbortMultipartRequest,
    ) -> AppResult<AbortMultipartResponse> {
        req.validate()?;
        let bucket = self.authorize(ctx, req.bucket_id).await?;
        ensure_key_in_bucket(&bucket, &req.key)?;

        self.objects
            .abort_multipart_upload(&req.key, &req.upload_id)
            .await?;

        info!(upload_id = %req.upload_id, key = %req.key, "Multipart upload aborted");
        self.audit
            .record(ctx.event(EventPayload::File(FileEvent::MultipartAborted {
                bucket_id: bucket.id.into_uuid(),
                key: req.key,
                upload_id: req.upload_id,
            })))
            .await;
        Ok(AbortMultipartResponse {
            status: "aborted".to_string(),
        })
    }
}

/// Parts must be non-empty, strictly ascending, in range, and tagged.
fn validate_parts(parts: &[CompletedPart]) -> AppResult<()> {
    if parts.is_empty() {
        return Err(AppError::validation("At least one part is required"));
    }
    let mut previous = 0;
    for part in parts {
        if !(1..=MAX_PART_NUMBER).contains(&part.part_number) {
            return Err(AppError::validation(format!(
                "Part number {} is out of range",
                part.part_number
            )));
        }
        if part.part_number <= previous {
            return Err(AppError::validation(
                "Parts must be listed in strictly ascending order",
            ));
        }
        if strip_etag_quotes(&part.etag).is_empty() {
            return Err(AppError::validation(format!(
                "Part {} has no ETag",
                part.part_number
            )));
        }
        previous = part.part_number;
    }
    Ok(())
}
