//! Recipient-side share operations.
//!
//! Every entry point re-checks the share against the clock and its quota.
//! A share found past its expiry or out of downloads is moved to `EXPIRED`
//! in the store before the error is returned.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use cloudvault_auth::token::IssuedToken;
use cloudvault_auth::{PasswordHasher, ShareTokenIssuer};
use cloudvault_core::config::{ShareConfig, StorageConfig};
use cloudvault_core::error::AppError;
use cloudvault_core::events::{DomainEvent, EventPayload, ShareEvent};
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::{EmailKind, ObjectStore, OutboundEmail, PresignedUrl};
use cloudvault_core::types::ShareId;
use cloudvault_database::{FileStore, ShareStore};
use cloudvault_entity::file::FileObject;
use cloudvault_entity::share::{PublicShareView, Share, ShareStatus, TerminalReason};
use cloudvault_entity::wire::ShareAuthRequest;

use crate::audit::AuditRecorder;
use crate::notification::NotificationDispatcher;

/// Used-link records outlive the link itself by this much, covering the
/// verifier's clock leeway.
const USED_LINK_GRACE_MINUTES: i64 = 5;

/// Public share access: view, magic-link authentication, and download.
#[derive(Debug, Clone)]
pub struct ShareAccessService {
    shares: Arc<dyn ShareStore>,
    files: Arc<dyn FileStore>,
    objects: Arc<dyn ObjectStore>,
    tokens: Arc<ShareTokenIssuer>,
    hasher: PasswordHasher,
    notifier: NotificationDispatcher,
    audit: AuditRecorder,
    share_config: ShareConfig,
    download_ttl: Duration,
}

impl ShareAccessService {
    /// Creates a new share access service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        shares: Arc<dyn ShareStore>,
        files: Arc<dyn FileStore>,
        objects: Arc<dyn ObjectStore>,
        tokens: Arc<ShareTokenIssuer>,
        notifier: NotificationDispatcher,
        audit: AuditRecorder,
        share_config: ShareConfig,
        storage_config: &StorageConfig,
    ) -> Self {
        Self {
            shares,
            files,
            objects,
            tokens,
            hasher: PasswordHasher::new(),
            notifier,
            audit,
            share_config,
            download_ttl: Duration::from_secs(storage_config.download_url_ttl_seconds),
        }
    }

    fn share_event(share: &Share, event: ShareEvent) -> DomainEvent {
        DomainEvent::new(Some(share.tenant_id.into_uuid()), None, EventPayload::Share(event))
    }

    /// Load a share that is usable at `now`, persisting any transition it
    /// is due for.
    async fn load_active(&self, share_id: ShareId, now: DateTime<Utc>) -> AppResult<Share> {
        let share = self
            .shares
            .find_by_id(share_id)
            .await?
            .ok_or_else(|| AppError::not_found("Share not found"))?;

        if let Some(reason) = share.terminal_reason() {
            return Err(reason.into_error());
        }
        let Some(reason) = share.due_transition(now) else {
            return Ok(share);
        };

        if let Some(expired) = self.shares.expire_if_active(share_id).await? {
            self.record_expiry(&expired, reason).await;
            return Err(reason.into_error());
        }

        // Another request moved it first; report whatever it landed on.
        let reason = self
            .shares
            .find_by_id(share_id)
            .await?
            .and_then(|s| s.terminal_reason())
            .unwrap_or(reason);
        Err(reason.into_error())
    }

    async fn record_expiry(&self, share: &Share, reason: TerminalReason) {
        let cause = match reason {
            TerminalReason::LimitReached => "download_limit",
            _ => "time",
        };
        info!(share_id = %share.id, reason = cause, "Share expired");
        self.audit
            .record(Self::share_event(
                share,
                ShareEvent::Expired {
                    share_id: share.id.into_uuid(),
                    reason: cause.to_string(),
                },
            ))
            .await;
    }

    async fn shared_file(&self, share: &Share) -> AppResult<FileObject> {
        self.files
            .find_by_id(share.file_id)
            .await?
            .ok_or_else(|| AppError::not_found("The shared file no longer exists"))
    }

    /// Public metadata of a usable share.
    pub async fn view(&self, share_id: ShareId) -> AppResult<PublicShareView> {
        let share = self.load_active(share_id, Utc::now()).await?;
        let file = self.shared_file(&share).await?;
        Ok(PublicShareView::new(&share, file.name, file.size))
    }

    /// Check the recipient's email (and password, if set) and mail a
    /// single-use magic link to the share's recipient address.
    pub async fn authenticate(&self, share_id: ShareId, req: ShareAuthRequest) -> AppResult<()> {
        let share = self.load_active(share_id, Utc::now()).await?;

        if req.email.trim().to_lowercase() != share.to_email.trim().to_lowercase() {
            return Err(AppError::authentication(
                "This email address is not the share's recipient",
            ));
        }
        if let Some(hash) = share.password_hash.as_deref() {
            let password = req
                .password
                .as_deref()
                .ok_or_else(|| AppError::authentication("This share requires a password"))?;
            if !self.hasher.verify_password(password, hash)? {
                return Err(AppError::authentication("Invalid share password"));
            }
        }

        let issued = self.tokens.issue_magic_link(share.id)?;
        let link = self.share_config.magic_link_url(&issued.token);

        info!(share_id = %share.id, "Magic link issued");
        self.audit
            .record(Self::share_event(
                &share,
                ShareEvent::MagicLinkIssued {
                    share_id: share.id.into_uuid(),
                },
            ))
            .await;
        self.notifier.dispatch(OutboundEmail {
            kind: EmailKind::MagicLink,
            to: share.to_email.clone(),
            subject: "Your download link".to_string(),
            body: format!(
                "Open {link} to access the shared file. This link works once and expires at {}.",
                issued.claims.expires_at().format("%H:%M UTC")
            ),
        });
        Ok(())
    }

    /// Forget used links that can no longer verify anyway.
    async fn purge_used_links(&self) {
        let cutoff = Utc::now() - chrono::Duration::minutes(USED_LINK_GRACE_MINUTES);
        match self.shares.purge_consumed_tokens(cutoff).await {
            Ok(0) => {}
            Ok(purged) => debug!(purged, "Purged expired magic link records"),
            Err(e) => warn!(error = %e, "Failed to purge expired magic link records"),
        }
    }

    /// Exchange a magic link for an access session. Each link works once.
    pub async fn verify(&self, token: &str) -> AppResult<IssuedToken> {
        let claims = self.tokens.decode_magic_link(token)?;
        let share = self.load_active(claims.share_id(), Utc::now()).await?;

        if !self
            .shares
            .consume_token(claims.jti, share.id, claims.expires_at())
            .await?
        {
            return Err(AppError::authentication(
                "This magic link has already been used",
            ));
        }
        self.purge_used_links().await;

        let session = self.tokens.issue_session(share.id)?;
        info!(share_id = %share.id, "Share session issued");
        self.audit
            .record(Self::share_event(
                &share,
                ShareEvent::SessionIssued {
                    share_id: share.id.into_uuid(),
                },
            ))
            .await;
        Ok(session)
    }

    /// Count one download and return a short-lived signed GET.
    ///
    /// The download is counted by a single conditional update; the share
    /// flips to `EXPIRED` in that same update when the quota is used up.
    pub async fn download(&self, share_id: ShareId, session: &str) -> AppResult<PresignedUrl> {
        let claims = self.tokens.decode_session(session)?;
        if claims.share_id() != share_id {
            return Err(AppError::authorization(
                "This session does not grant access to the share",
            ));
        }

        let share = self.load_active(share_id, Utc::now()).await?;
        let file = self.shared_file(&share).await?;
        let signed = self
            .objects
            .presign_get(&file.key, self.download_ttl, Some(&file.name))
            .await?;

        let now = Utc::now();
        let Some(counted) = self.shares.try_consume_download(share_id, now).await? else {
            // Lost the race or crossed the expiry since the check above.
            return Err(match self.load_active(share_id, now).await {
                Err(e) => e,
                Ok(_) => AppError::conflict("The share changed while downloading; retry"),
            });
        };

        info!(
            share_id = %share_id,
            downloads = counted.downloads,
            download_limit = counted.download_limit,
            "Share downloaded"
        );
        self.audit
            .record(Self::share_event(
                &counted,
                ShareEvent::Downloaded {
                    share_id: share_id.into_uuid(),
                    download_count: counted.downloads,
                    download_limit: counted.download_limit,
                },
            ))
            .await;
        if counted.status == ShareStatus::Expired {
            self.record_expiry(&counted, TerminalReason::LimitReached).await;
        }

        Ok(signed)
    }
}
