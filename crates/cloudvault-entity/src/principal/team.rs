//! Teams and memberships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cloudvault_core::types::{TeamId, TenantId, UserId};

/// A team inside a tenant. Policies may be owned by a team.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    /// Team ID.
    pub id: TeamId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Display name.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Membership of a user in a team.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TeamMembership {
    /// The team.
    pub team_id: TeamId,
    /// The member.
    pub user_id: UserId,
    /// Inactive memberships keep the row but grant nothing.
    pub active: bool,
    /// When the user joined.
    pub created_at: DateTime<Utc>,
}
