//! Share persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use cloudvault_core::result::AppResult;
use cloudvault_core::types::{ShareId, UserId};
use cloudvault_entity::share::Share;

/// Persistence for share records.
///
/// Every state change is a single conditional update: it applies only if
/// the record is still `ACTIVE` (and, for downloads, under quota), and
/// returns `None` when the condition no longer holds.
#[async_trait]
pub trait ShareStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new share.
    async fn insert(&self, share: &Share) -> AppResult<Share>;

    /// Find a share by ID.
    async fn find_by_id(&self, id: ShareId) -> AppResult<Option<Share>>;

    /// Shares created by a user, newest first.
    async fn list_by_creator(&self, user_id: UserId) -> AppResult<Vec<Share>>;

    /// `ACTIVE` → `EXPIRED`. `None` if the share was not active.
    async fn expire_if_active(&self, id: ShareId) -> AppResult<Option<Share>>;

    /// Count one download: `downloads + 1` when active, unexpired at `now`,
    /// and under quota; flips to `EXPIRED` in the same update when the
    /// quota is reached. `None` if the condition failed.
    async fn try_consume_download(&self, id: ShareId, now: DateTime<Utc>)
    -> AppResult<Option<Share>>;

    /// `ACTIVE` → `REVOKED`. `None` if the share was not active.
    async fn revoke_if_active(&self, id: ShareId, now: DateTime<Utc>) -> AppResult<Option<Share>>;

    /// Record a magic-link token ID as used. Returns `false` if it had
    /// already been used.
    async fn consume_token(
        &self,
        jti: Uuid,
        share_id: ShareId,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Drop used-token records whose link expired before `before`.
    /// Returns how many were removed.
    async fn purge_consumed_tokens(&self, before: DateTime<Utc>) -> AppResult<u64>;
}
