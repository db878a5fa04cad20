//! Single-shot signed URLs and registration of finished uploads.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use validator::Validate;

use cloudvault_auth::PolicyGuard;
use cloudvault_core::config::StorageConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::events::{EventPayload, FileEvent};
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::ObjectStore;
use cloudvault_database::{BucketStore, FileStore};
use cloudvault_entity::file::{FileObject, NewFileObject};
use cloudvault_entity::permission::Action;
use cloudvault_entity::wire::{PresignAction, PresignRequest, PresignResponse, RegisterFileRequest};
use cloudvault_storage::keys;

use super::{ensure_key_in_bucket, load_bucket};
use crate::audit::AuditRecorder;
use crate::context::RequestContext;

/// Issues single-object signed URLs.
#[derive(Debug, Clone)]
pub struct PresignService {
    buckets: Arc<dyn BucketStore>,
    files: Arc<dyn FileStore>,
    objects: Arc<dyn ObjectStore>,
    guard: PolicyGuard,
    audit: AuditRecorder,
    config: StorageConfig,
}

impl PresignService {
    /// Creates a new presign service.
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

    /// Sign a PUT or GET for one object of a bucket.
    ///
    /// Uploads without a key get a fresh one derived from `name`; every
    /// other request must name a key under the bucket's prefix.
    pub async fn presign(
        &self,
        ctx: &RequestContext,
        req: PresignRequest,
    ) -> AppResult<PresignResponse> {
        req.validate()?;
        let bucket = load_bucket(self.buckets.as_ref(), req.bucket_id).await?;
        let action = match req.action {
            PresignAction::Upload => Action::Upload,
            PresignAction::Download => Action::Download,
            PresignAction::Read => Action::Read,
        };
        self.guard
            .require(&ctx.principal, action, &bucket.descriptor())?;

        let key = match (req.action, req.key) {
            (_, Some(key)) => {
                ensure_key_in_bucket(&bucket, &key)?;
                key
            }
            (PresignAction::Upload, None) => {
                let name = req
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| AppError::validation("Either key or name is required"))?;
                keys::upload_key(bucket.tenant_id, bucket.id, req.parent_id, name)
            }
            (_, None) => return Err(AppError::validation("key is required to sign a download")),
        };

        let signed = match req.action {
            PresignAction::Upload => {
                self.objects
                    .presign_put(
                        &key,
                        req.content_type.as_deref(),
                        Duration::from_secs(self.config.upload_url_ttl_seconds),
                    )
                    .await?
            }
            PresignAction::Download => {
                let download_name = self
                    .files
                    .find_by_key(bucket.id, &key)
                    .await?
                    .map(|f| f.name);
                let signed = self
                    .objects
                    .presign_get(
                        &key,
                        Duration::from_secs(self.config.download_url_ttl_seconds),
                        download_name.as_deref(),
                    )
                    .await?;
                self.audit
                    .record(ctx.event(EventPayload::File(FileEvent::DownloadSigned {
                        bucket_id: bucket.id.into_uuid(),
                        key: key.clone(),
                    })))
                    .await;
                signed
            }
            PresignAction::Read => {
                self.objects
                    .presign_get(
                        &key,
                        Duration::from_secs(self.config.download_url_ttl_seconds),
                        None,
                    )
                    .await?
            }
        };

        Ok(PresignResponse {
            url: signed.url,
            key,
            expires_at: signed.expires_at,
        })
    }

    /// Record metadata for an object uploaded through a signed PUT.
    pub async fn register(
        &self,
        ctx: &RequestContext,
        req: RegisterFileRequest,
    ) -> AppResult<FileObject> {
        req.validate()?;
        let bucket = load_bucket(self.buckets.as_ref(), req.bucket_id).await?;
        self.guard
            .require(&ctx.principal, Action::Upload, &bucket.descriptor())?;
        ensure_key_in_bucket(&bucket, &req.key)?;
        let name = req.name.trim();
        if self.objects.head_object(&req.key).await?.is_none() {
            return Err(AppError::not_found(format!(
                "No uploaded object at key {}",
                req.key
            )));
        }

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
            bucket_id = %file.bucket_id,
            size = file.size,
            "File registered"
        );
        self.audit
            .record(ctx.event(EventPayload::File(FileEvent::Uploaded {
                file_id: file.id.into_uuid(),
                bucket_id: file.bucket_id.into_uuid(),
                key: file.key.clone(),
                name: file.name.clone(),
                size_bytes: file.size,
                multipart: false,
            })))
            .await;

        Ok(file)
    }
}
