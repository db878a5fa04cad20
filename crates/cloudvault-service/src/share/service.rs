//! Owner-side share operations.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;
use validator::Validate;

use cloudvault_auth::{PasswordHasher, PolicyGuard};
use cloudvault_core::config::ShareConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::events::{EventPayload, ShareEvent};
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::{EmailKind, OutboundEmail};
use cloudvault_core::types::ShareId;
use cloudvault_database::{FileStore, ShareStore};
use cloudvault_entity::permission::Action;
use cloudvault_entity::share::{NewShare, Share};
use cloudvault_entity::wire::{CreateShareRequest, CreateShareResponse};

use crate::audit::AuditRecorder;
use crate::context::RequestContext;
use crate::notification::NotificationDispatcher;
use crate::storage::file_resources;

/// Creates, lists, and revokes shares.
#[derive(Debug, Clone)]
pub struct ShareService {
    shares: Arc<dyn ShareStore>,
    files: Arc<dyn FileStore>,
    hasher: PasswordHasher,
    guard: PolicyGuard,
    notifier: NotificationDispatcher,
    audit: AuditRecorder,
    config: ShareConfig,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        shares: Arc<dyn ShareStore>,
        files: Arc<dyn FileStore>,
        notifier: NotificationDispatcher,
        audit: AuditRecorder,
        config: ShareConfig,
    ) -> Self {
        Self {
            shares,
            files,
            hasher: PasswordHasher::new(),
            guard: PolicyGuard::new(),
            notifier,
            audit,
            config,
        }
    }

    /// Share one file with an external recipient.
    ///
    /// A missing or unparsable download limit falls back to the configured
    /// default. The recipient is emailed the share URL in the background.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateShareRequest,
    ) -> AppResult<CreateShareResponse> {
        req.validate()?;
        let to_email = req.to_email.trim().to_string();

        let file = self
            .files
            .find_by_id(req.file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {} not found", req.file_id)))?;
        self.guard
            .require_any(&ctx.principal, Action::Share, &file_resources(&file))?;

        let expiry_days = req.expiry_days.unwrap_or(self.config.default_expiry_days);
        if expiry_days > self.config.max_expiry_days {
            return Err(AppError::validation(format!(
                "expiryDays must be between 1 and {}",
                self.config.max_expiry_days
            )));
        }
        let download_limit = req
            .parsed_download_limit()
            .unwrap_or(self.config.default_download_limit);

        let password_hash = match req.password.as_deref() {
            Some(password) if !password.is_empty() => Some(self.hasher.hash_password(password)?),
            _ => None,
        };

        let share = self
            .shares
            .insert(
                &NewShare {
                    file_id: file.id,
                    tenant_id: file.tenant_id,
                    created_by: ctx.user_id(),
                    to_email,
                    expires_at: Utc::now() + Duration::days(expiry_days),
                    download_limit,
                    password_hash,
                }
                .into_share(),
            )
            .await?;
        let share_url = self.config.share_url(&share.id);

        info!(
            share_id = %share.id,
            file_id = %share.file_id,
            download_limit = share.download_limit,
            expires_at = %share.expires_at,
            "Share created"
        );
        self.audit
            .record(ctx.event(EventPayload::Share(ShareEvent::Created {
                share_id: share.id.into_uuid(),
                file_id: share.file_id.into_uuid(),
                download_limit: share.download_limit,
                password_protected: share.is_password_protected(),
            })))
            .await;
        self.notifier.dispatch(OutboundEmail {
            kind: EmailKind::ShareInvitation,
            to: share.to_email.clone(),
            subject: format!("{} shared \"{}\" with you", ctx.principal.email, file.name),
            body: format!(
                "Open {share_url} to download \"{}\". The link expires on {}.",
                file.name,
                share.expires_at.format("%Y-%m-%d %H:%M UTC")
            ),
        });

        Ok(CreateShareResponse { share, share_url })
    }

    /// Shares created by the caller, newest first.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<Share>> {
        self.shares.list_by_creator(ctx.user_id()).await
    }

    /// Revoke a share. Allowed for its creator and for administrators of
    /// its tenant; revoking a share that is no longer active changes nothing.
    pub async fn revoke(&self, ctx: &RequestContext, share_id: ShareId) -> AppResult<Share> {
        let share = self
            .shares
            .find_by_id(share_id)
            .await?
            .ok_or_else(|| AppError::not_found("Share not found"))?;
        if share.created_by != ctx.user_id() && !ctx.principal.administers(share.tenant_id) {
            return Err(AppError::authorization(
                "Only the creator or an administrator may revoke this share",
            ));
        }

        match self.shares.revoke_if_active(share_id, Utc::now()).await? {
            Some(revoked) => {
                info!(share_id = %share_id, revoked_by = %ctx.user_id(), "Share revoked");
                self.audit
                    .record(ctx.event(EventPayload::Share(ShareEvent::Revoked {
                        share_id: share_id.into_uuid(),
                    })))
                    .await;
                Ok(revoked)
            }
            None => Ok(self.shares.find_by_id(share_id).await?.unwrap_or(share)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use cloudvault_core::error::ErrorKind;
    use cloudvault_core::types::TenantId;
    use cloudvault_entity::principal::Role;
    use cloudvault_entity::share::ShareStatus;

    use super::*;
    use crate::test_support::{Harness, grant_bucket};

    fn request(file_id: cloudvault_core::types::FileId) -> CreateShareRequest {
        CreateShareRequest {
            file_id,
            to_email: "guest@example.com".to_string(),
            expiry_days: None,
            download_limit: Some(json!("oops")),
            password: Some("hunter2".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults_and_notifies() {
        let h = Harness::new();
        let tenant = TenantId::new();
        let bucket = h.bucket(tenant).await;
        let owner = h.user(tenant, Role::Teammate).await;
        grant_bucket(&h.store, &owner, Some(bucket.id), &[Action::Share]).await;
        let file = h.file(&bucket, &owner, "plan.pdf").await;
        let ctx = h.context(&owner).await;

        let created = h.shares.create(&ctx, request(file.id)).await.unwrap();
        assert_eq!(created.share.download_limit, 3);
        assert_eq!(created.share.downloads, 0);
        assert_eq!(created.share.status, ShareStatus::Active);
        assert!(created.share.is_password_protected());
        assert!(created.share_url.ends_with(&format!("/shares/{}", created.share.id)));
        let days = (created.share.expires_at - created.share.created_at).num_days();
        assert!((6..=7).contains(&days));

        h.settle().await;
        let sent = h.notifications.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, EmailKind::ShareInvitation);
        assert!(sent[0].body.contains(&created.share_url));
    }

    #[tokio::test]
    async fn test_create_requires_share_permission() {
        let h = Harness::new();
        let tenant = TenantId::new();
        let bucket = h.bucket(tenant).await;
        let owner = h.user(tenant, Role::Teammate).await;
        grant_bucket(&h.store, &owner, Some(bucket.id), &[Action::Read]).await;
        let file = h.file(&bucket, &owner, "plan.pdf").await;
        let ctx = h.context(&owner).await;

        let err = h.shares.create(&ctx, request(file.id)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_recipients() {
        let h = Harness::new();
        let tenant = TenantId::new();
        let bucket = h.bucket(tenant).await;
        let owner = h.user(tenant, Role::TenantAdmin).await;
        let file = h.file(&bucket, &owner, "plan.pdf").await;
        let ctx = h.context(&owner).await;

        for to_email in ["a@", "guest", "@example.com"] {
            let req = CreateShareRequest {
                to_email: to_email.to_string(),
                ..request(file.id)
            };
            let err = h.shares.create(&ctx, req).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "{to_email}");
        }
        assert!(ShareStore::list_by_creator(&h.store, owner.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent_and_restricted() {
        let h = Harness::new();
        let tenant = TenantId::new();
        let bucket = h.bucket(tenant).await;
        let owner = h.user(tenant, Role::TenantAdmin).await;
        let stranger = h.user(tenant, Role::Teammate).await;
        let file = h.file(&bucket, &owner, "plan.pdf").await;
        let ctx = h.context(&owner).await;
        let created = h.shares.create(&ctx, request(file.id)).await.unwrap();

        let stranger_ctx = h.context(&stranger).await;
        let err = h
            .shares
            .revoke(&stranger_ctx, created.share.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let first = h.shares.revoke(&ctx, created.share.id).await.unwrap();
        assert_eq!(first.status, ShareStatus::Revoked);
        let second = h.shares.revoke(&ctx, created.share.id).await.unwrap();
        assert_eq!(second.status, ShareStatus::Revoked);
        assert_eq!(second.revoked_at, first.revoked_at);

        let listed = h.shares.list(&ctx).await.unwrap();
        assert_eq!(listed.len(), 1);
    }
}
