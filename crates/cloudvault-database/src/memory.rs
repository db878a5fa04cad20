//! In-memory metadata store for development and tests.
//!
//! One mutex guards all tables, so every conditional update is atomic
//! in the same way as the SQL versions.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use cloudvault_core::error::AppError;
use cloudvault_core::events::DomainEvent;
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::AuditSink;
use cloudvault_core::types::{BucketId, FileId, PolicyId, ShareId, TeamId, TenantId, UserId};
use cloudvault_entity::audit::AuditLog;
use cloudvault_entity::bucket::Bucket;
use cloudvault_entity::file::FileObject;
use cloudvault_entity::permission::{Policy, PolicyOwner};
use cloudvault_entity::principal::{Principal, Team, TeamGrant, TeamMembership, User};
use cloudvault_entity::share::{Share, ShareStatus};

use crate::store::{BucketStore, FileStore, PrincipalStore, ShareStore};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    teams: HashMap<TeamId, Team>,
    memberships: BTreeMap<(TeamId, UserId), TeamMembership>,
    policies: BTreeMap<PolicyId, Policy>,
    buckets: HashMap<BucketId, Bucket>,
    files: HashMap<FileId, FileObject>,
    shares: HashMap<ShareId, Share>,
    consumed_tokens: HashMap<Uuid, DateTime<Utc>>,
    audit: Vec<AuditLog>,
}

/// Every store trait plus [`AuditSink`] over shared in-process tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Audit entries recorded so far, oldest first.
    pub async fn audit_records(&self) -> Vec<AuditLog> {
        self.tables.lock().await.audit.clone()
    }
}

#[async_trait]
impl ShareStore for MemoryStore {
    async fn insert(&self, share: &Share) -> AppResult<Share> {
        let mut tables = self.tables.lock().await;
        if tables.shares.contains_key(&share.id) {
            return Err(AppError::conflict("Failed to create share: record already exists"));
        }
        tables.shares.insert(share.id, share.clone());
        Ok(share.clone())
    }

    async fn find_by_id(&self, id: ShareId) -> AppResult<Option<Share>> {
        Ok(self.tables.lock().await.shares.get(&id).cloned())
    }

    async fn list_by_creator(&self, user_id: UserId) -> AppResult<Vec<Share>> {
        let tables = self.tables.lock().await;
        let mut shares: Vec<Share> = tables
            .shares
            .values()
            .filter(|s| s.created_by == user_id)
            .cloned()
            .collect();
        shares.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(shares)
    }

    async fn expire_if_active(&self, id: ShareId) -> AppResult<Option<Share>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .shares
            .get_mut(&id)
            .filter(|s| s.status == ShareStatus::Active)
            .map(|s| {
                s.status = ShareStatus::Expired;
                s.clone()
            }))
    }

    async fn try_consume_download(
        &self,
        id: ShareId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Share>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .shares
            .get_mut(&id)
            .filter(|s| {
                s.status == ShareStatus::Active
                    && s.downloads < s.download_limit
                    && s.expires_at >= now
            })
            .map(|s| {
                s.downloads += 1;
                s.last_accessed_at = Some(now);
                if s.downloads >= s.download_limit {
                    s.status = ShareStatus::Expired;
                }
                s.clone()
            }))
    }

    async fn revoke_if_active(&self, id: ShareId, now: DateTime<Utc>) -> AppResult<Option<Share>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .shares
            .get_mut(&id)
            .filter(|s| s.status == ShareStatus::Active)
            .map(|s| {
                s.status = ShareStatus::Revoked;
                s.revoked_at = Some(now);
                s.clone()
            }))
    }

    async fn consume_token(
        &self,
        jti: Uuid,
        _share_id: ShareId,
        expires_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        if tables.consumed_tokens.contains_key(&jti) {
            return Ok(false);
        }
        tables.consumed_tokens.insert(jti, expires_at);
        Ok(true)
    }

    async fn purge_consumed_tokens(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut tables = self.tables.lock().await;
        let len = tables.consumed_tokens.len();
        tables.consumed_tokens.retain(|_, expires_at| *expires_at >= before);
        Ok((len - tables.consumed_tokens.len()) as u64)
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn insert(&self, file: &FileObject) -> AppResult<FileObject> {
        let mut tables = self.tables.lock().await;
        if tables.files.values().any(|f| f.key == file.key) {
            return Err(AppError::conflict("Failed to register file: record already exists"));
        }
        tables.files.insert(file.id, file.clone());
        Ok(file.clone())
    }

    async fn find_by_id(&self, id: FileId) -> AppResult<Option<FileObject>> {
        Ok(self.tables.lock().await.files.get(&id).cloned())
    }

    async fn find_by_key(&self, bucket_id: BucketId, key: &str) -> AppResult<Option<FileObject>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .files
            .values()
            .find(|f| f.bucket_id == bucket_id && f.key == key)
            .cloned())
    }

    async fn delete(&self, id: FileId) -> AppResult<bool> {
        Ok(self.tables.lock().await.files.remove(&id).is_some())
    }
}

#[async_trait]
impl BucketStore for MemoryStore {
    async fn insert(&self, bucket: &Bucket) -> AppResult<Bucket> {
        let mut tables = self.tables.lock().await;
        if tables
            .buckets
            .values()
            .any(|b| b.tenant_id == bucket.tenant_id && b.name == bucket.name)
        {
            return Err(AppError::conflict(format!(
                "Failed to create bucket: '{}' already exists",
                bucket.name
            )));
        }
        tables.buckets.insert(bucket.id, bucket.clone());
        Ok(bucket.clone())
    }

    async fn find_by_id(&self, id: BucketId) -> AppResult<Option<Bucket>> {
        Ok(self.tables.lock().await.buckets.get(&id).cloned())
    }

    async fn list_by_tenant(&self, tenant_id: TenantId) -> AppResult<Vec<Bucket>> {
        let tables = self.tables.lock().await;
        let mut buckets: Vec<Bucket> = tables
            .buckets
            .values()
            .filter(|b| b.tenant_id == tenant_id)
            .cloned()
            .collect();
        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(buckets)
    }
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn create_user_if_absent(&self, user: &User) -> AppResult<User> {
        let mut tables = self.tables.lock().await;
        Ok(tables.users.entry(user.id).or_insert_with(|| user.clone()).clone())
    }

    async fn load_principal(&self, user: &User) -> AppResult<Principal> {
        let tables = self.tables.lock().await;
        let owned_by = |owner: PolicyOwner| -> Vec<Policy> {
            tables
                .policies
                .values()
                .filter(|p| p.owner == owner)
                .cloned()
                .collect()
        };

        let mut principal = Principal::from_user(user);
        principal.direct_policies = owned_by(PolicyOwner::User(user.id));
        principal.team_memberships = tables
            .memberships
            .values()
            .filter(|m| m.user_id == user.id)
            .map(|m| TeamGrant {
                team_id: m.team_id,
                active: m.active,
                policies: owned_by(PolicyOwner::Team(m.team_id)),
            })
            .collect();
        Ok(principal)
    }

    async fn insert_policy(&self, policy: &Policy) -> AppResult<Policy> {
        let mut tables = self.tables.lock().await;
        tables.policies.insert(policy.id, policy.clone());
        Ok(policy.clone())
    }

    async fn find_policy(&self, id: PolicyId) -> AppResult<Option<Policy>> {
        Ok(self.tables.lock().await.policies.get(&id).cloned())
    }

    async fn delete_policy(&self, id: PolicyId) -> AppResult<bool> {
        Ok(self.tables.lock().await.policies.remove(&id).is_some())
    }

    async fn insert_team(&self, team: &Team) -> AppResult<Team> {
        let mut tables = self.tables.lock().await;
        if tables
            .teams
            .values()
            .any(|t| t.tenant_id == team.tenant_id && t.name == team.name)
        {
            return Err(AppError::conflict(format!(
                "Failed to create team: '{}' already exists",
                team.name
            )));
        }
        tables.teams.insert(team.id, team.clone());
        Ok(team.clone())
    }

    async fn find_team(&self, id: TeamId) -> AppResult<Option<Team>> {
        Ok(self.tables.lock().await.teams.get(&id).cloned())
    }

    async fn add_membership(&self, membership: &TeamMembership) -> AppResult<TeamMembership> {
        let mut tables = self.tables.lock().await;
        let key = (membership.team_id, membership.user_id);
        if tables.memberships.contains_key(&key) {
            return Err(AppError::conflict("Failed to add team member: already a member"));
        }
        tables.memberships.insert(key, membership.clone());
        Ok(membership.clone())
    }

    async fn set_membership_active(
        &self,
        team_id: TeamId,
        user_id: UserId,
        active: bool,
    ) -> AppResult<Option<TeamMembership>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.memberships.get_mut(&(team_id, user_id)).map(|m| {
            m.active = active;
            m.clone()
        }))
    }
}

#[async_trait]
impl AuditSink for MemoryStore {
    async fn record(&self, event: &DomainEvent) -> AppResult<()> {
        let entry = AuditLog::from_event(event)?;
        self.tables.lock().await.audit.push(entry);
        Ok(())
    }
}
