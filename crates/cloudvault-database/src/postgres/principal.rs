//! Users, teams, memberships, and policies on PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::{PolicyId, TeamId, TenantId, UserId};
use cloudvault_entity::permission::{Action, Policy, PolicyOwner, ResourceType};
use cloudvault_entity::principal::{Principal, Team, TeamGrant, TeamMembership, User};

use super::db_error;
use crate::store::PrincipalStore;

/// Flat policy row; the owner is split into kind and ID columns.
#[derive(Debug, FromRow)]
struct PolicyRow {
    id: PolicyId,
    tenant_id: TenantId,
    owner_kind: String,
    owner_id: Uuid,
    resource_type: ResourceType,
    resource_id: Option<Uuid>,
    actions: Vec<Action>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PolicyRow> for Policy {
    type Error = AppError;

    fn try_from(row: PolicyRow) -> Result<Self, Self::Error> {
        let owner = match row.owner_kind.as_str() {
            "user" => PolicyOwner::User(UserId::from_uuid(row.owner_id)),
            "team" => PolicyOwner::Team(TeamId::from_uuid(row.owner_id)),
            other => {
                return Err(AppError::database(format!(
                    "Policy {} has unknown owner kind '{other}'",
                    row.id
                )));
            }
        };
        Ok(Policy {
            id: row.id,
            tenant_id: row.tenant_id,
            owner,
            resource_type: row.resource_type,
            resource_id: row.resource_id,
            actions: row.actions.into_iter().collect(),
            created_at: row.created_at,
        })
    }
}

fn into_policies(rows: Vec<PolicyRow>) -> AppResult<Vec<Policy>> {
    rows.into_iter().map(Policy::try_from).collect()
}

/// Principal records across `users`, `teams`, `team_memberships`, and
/// `policies`.
#[derive(Debug, Clone)]
pub struct PgPrincipalStore {
    pool: PgPool,
}

impl PgPrincipalStore {
    /// Create a new principal store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for PgPrincipalStore {
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user"))
    }

    async fn create_user_if_absent(&self, user: &User) -> AppResult<User> {
        sqlx::query(
            "INSERT INTO users (id, tenant_id, email, role, created_at) \
             VALUES ($1, $2, $3, $4, $5) ON CONFLICT (id) DO NOTHING",
        )
        .bind(user.id)
        .bind(user.tenant_id)
        .bind(&user.email)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to create user"))?;

        self.find_user(user.id)
            .await?
            .ok_or_else(|| AppError::database("User vanished after insert"))
    }

    async fn load_principal(&self, user: &User) -> AppResult<Principal> {
        let direct = sqlx::query_as::<_, PolicyRow>(
            "SELECT * FROM policies WHERE owner_kind = 'user' AND owner_id = $1",
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load user policies"))?;

        let memberships = sqlx::query_as::<_, TeamMembership>(
            "SELECT * FROM team_memberships WHERE user_id = $1",
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load team memberships"))?;

        let team_ids: Vec<Uuid> = memberships.iter().map(|m| m.team_id.into_uuid()).collect();
        let team_rows = sqlx::query_as::<_, PolicyRow>(
            "SELECT * FROM policies WHERE owner_kind = 'team' AND owner_id = ANY($1)",
        )
        .bind(&team_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load team policies"))?;

        let mut by_team: HashMap<Uuid, Vec<Policy>> = HashMap::new();
        for policy in into_policies(team_rows)? {
            by_team.entry(policy.owner.id()).or_default().push(policy);
        }

        let mut principal = Principal::from_user(user);
        principal.direct_policies = into_policies(direct)?;
        principal.team_memberships = memberships
            .into_iter()
            .map(|m| TeamGrant {
                team_id: m.team_id,
                active: m.active,
                policies: by_team.remove(m.team_id.as_uuid()).unwrap_or_default(),
            })
            .collect();
        Ok(principal)
    }

    async fn insert_policy(&self, policy: &Policy) -> AppResult<Policy> {
        let actions: Vec<Action> = policy.actions.iter().copied().collect();
        let row = sqlx::query_as::<_, PolicyRow>(
            "INSERT INTO policies (id, tenant_id, owner_kind, owner_id, resource_type, \
             resource_id, actions, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(policy.id)
        .bind(policy.tenant_id)
        .bind(policy.owner.kind())
        .bind(policy.owner.id())
        .bind(policy.resource_type)
        .bind(policy.resource_id)
        .bind(&actions)
        .bind(policy.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create policy"))?;
        Policy::try_from(row)
    }

    async fn find_policy(&self, id: PolicyId) -> AppResult<Option<Policy>> {
        sqlx::query_as::<_, PolicyRow>("SELECT * FROM policies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find policy"))?
            .map(Policy::try_from)
            .transpose()
    }

    async fn delete_policy(&self, id: PolicyId) -> AppResult<bool> {
        sqlx::query("DELETE FROM policies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(db_error("Failed to delete policy"))
    }

    async fn insert_team(&self, team: &Team) -> AppResult<Team> {
        sqlx::query_as::<_, Team>(
            "INSERT INTO teams (id, tenant_id, name, created_at) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(team.id)
        .bind(team.tenant_id)
        .bind(&team.name)
        .bind(team.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create team"))
    }

    async fn find_team(&self, id: TeamId) -> AppResult<Option<Team>> {
        sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find team"))
    }

    async fn add_membership(&self, membership: &TeamMembership) -> AppResult<TeamMembership> {
        sqlx::query_as::<_, TeamMembership>(
            "INSERT INTO team_memberships (team_id, user_id, active, created_at) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(membership.team_id)
        .bind(membership.user_id)
        .bind(membership.active)
        .bind(membership.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to add team member"))
    }

    async fn set_membership_active(
        &self,
        team_id: TeamId,
        user_id: UserId,
        active: bool,
    ) -> AppResult<Option<TeamMembership>> {
        sqlx::query_as::<_, TeamMembership>(
            "UPDATE team_memberships SET active = $3 \
             WHERE team_id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(team_id)
        .bind(user_id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update team membership"))
    }
}
