//! User records and the principal snapshot the policy engine evaluates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cloudvault_core::types::{TeamId, TenantId, UserId};

use super::role::Role;
use crate::permission::Policy;

/// A persisted user record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier (matches the identity provider subject).
    pub id: UserId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Email address.
    pub email: String,
    /// Stored role; the identity provider's claim never overrides it.
    pub role: Role,
    /// When the user was first seen.
    pub created_at: DateTime<Utc>,
}

/// Policies reachable through one team membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamGrant {
    /// The team.
    pub team_id: TeamId,
    /// Inactive memberships contribute nothing.
    pub active: bool,
    /// The team's policies.
    pub policies: Vec<Policy>,
}

/// Immutable snapshot of an authenticated actor and every grant it holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// User ID.
    pub id: UserId,
    /// Tenant the principal belongs to.
    pub tenant_id: TenantId,
    /// Email address.
    pub email: String,
    /// Stored role.
    pub role: Role,
    /// Policies owned by the user directly.
    pub direct_policies: Vec<Policy>,
    /// Team memberships with their policies.
    pub team_memberships: Vec<TeamGrant>,
}

impl Principal {
    /// Snapshot a user with no policies or memberships.
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            tenant_id: user.tenant_id,
            email: user.email.clone(),
            role: user.role,
            direct_policies: Vec::new(),
            team_memberships: Vec::new(),
        }
    }

    /// Whether this principal administers `tenant_id`.
    pub fn administers(&self, tenant_id: TenantId) -> bool {
        match self.role {
            Role::PlatformAdmin => true,
            Role::TenantAdmin => self.tenant_id == tenant_id,
            Role::Teammate => false,
        }
    }
}
