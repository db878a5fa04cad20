//! Policy grants, teams, and memberships.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use validator::Validate;

use cloudvault_core::error::AppError;
use cloudvault_core::events::{AccessEvent, EventPayload};
use cloudvault_core::result::AppResult;
use cloudvault_core::types::{PolicyId, TeamId, TenantId, UserId};
use cloudvault_database::PrincipalStore;
use cloudvault_entity::permission::{NewPolicy, Policy, PolicyOwner};
use cloudvault_entity::principal::{Role, Team, TeamMembership};

use crate::audit::AuditRecorder;
use crate::context::RequestContext;

/// Administers grants inside a tenant.
///
/// Every operation requires a tenant admin of the affected tenant or a
/// platform admin.
#[derive(Debug, Clone)]
pub struct AccessAdminService {
    store: Arc<dyn PrincipalStore>,
    audit: AuditRecorder,
}

impl AccessAdminService {
    /// Creates a new access administration service.
    pub fn new(store: Arc<dyn PrincipalStore>, audit: AuditRecorder) -> Self {
        Self { store, audit }
    }

    fn require_admin(ctx: &RequestContext, tenant_id: TenantId) -> AppResult<()> {
        if ctx.principal.administers(tenant_id) {
            Ok(())
        } else {
            Err(Self::denied())
        }
    }

    fn denied() -> AppError {
        AppError::authorization("Only administrators of this tenant may change access")
    }

    async fn load_team(&self, team_id: TeamId) -> AppResult<Team> {
        self.store
            .find_team(team_id)
            .await?
            .ok_or_else(|| AppError::not_found("Team not found"))
    }

    /// Grant a policy to a user or team. The policy lives in the owner's tenant.
    ///
    /// Only platform admins can tell a missing owner from a foreign one;
    /// everyone else gets the same authorization error for both.
    pub async fn grant_policy(&self, ctx: &RequestContext, req: NewPolicy) -> AppResult<Policy> {
        Self::require_admin(ctx, ctx.tenant_id())?;
        req.validate()?;

        let owner_tenant = match req.owner {
            PolicyOwner::User(user_id) => self.store.find_user(user_id).await?.map(|u| u.tenant_id),
            PolicyOwner::Team(team_id) => self.store.find_team(team_id).await?.map(|t| t.tenant_id),
        };
        let tenant_id = match owner_tenant {
            Some(tenant_id) => tenant_id,
            None if ctx.principal.role == Role::PlatformAdmin => {
                return Err(AppError::not_found(format!(
                    "{} {} not found",
                    req.owner.kind(),
                    req.owner.id()
                )));
            }
            None => return Err(Self::denied()),
        };
        Self::require_admin(ctx, tenant_id)?;

        let policy = self.store.insert_policy(&req.into_policy(tenant_id)).await?;

        info!(
            policy_id = %policy.id,
            owner_kind = policy.owner.kind(),
            owner_id = %policy.owner.id(),
            granted_by = %ctx.user_id(),
            "Policy granted"
        );
        self.audit
            .record(ctx.event(EventPayload::Access(AccessEvent::PolicyGranted {
                policy_id: policy.id.into_uuid(),
                owner_kind: policy.owner.kind().to_string(),
                owner_id: policy.owner.id(),
                actions: policy.actions.iter().map(|a| a.as_str().to_string()).collect(),
            })))
            .await;

        Ok(policy)
    }

    /// Delete a policy.
    pub async fn delete_policy(&self, ctx: &RequestContext, policy_id: PolicyId) -> AppResult<()> {
        let policy = self
            .store
            .find_policy(policy_id)
            .await?
            .ok_or_else(|| AppError::not_found("Policy not found"))?;
        Self::require_admin(ctx, policy.tenant_id)?;

        if !self.store.delete_policy(policy_id).await? {
            return Err(AppError::not_found("Policy not found"));
        }

        info!(policy_id = %policy_id, deleted_by = %ctx.user_id(), "Policy deleted");
        self.audit
            .record(ctx.event(EventPayload::Access(AccessEvent::PolicyDeleted {
                policy_id: policy_id.into_uuid(),
            })))
            .await;
        Ok(())
    }

    /// Create a team in the caller's tenant.
    pub async fn create_team(&self, ctx: &RequestContext, name: &str) -> AppResult<Team> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Team name must not be empty"));
        }
        Self::require_admin(ctx, ctx.tenant_id())?;

        let team = Team {
            id: TeamId::new(),
            tenant_id: ctx.tenant_id(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        let team = self.store.insert_team(&team).await?;
        info!(team_id = %team.id, name = %team.name, "Team created");
        Ok(team)
    }

    /// Add a user of the team's tenant as an active member.
    pub async fn add_member(
        &self,
        ctx: &RequestContext,
        team_id: TeamId,
        user_id: UserId,
    ) -> AppResult<TeamMembership> {
        let team = self.load_team(team_id).await?;
        Self::require_admin(ctx, team.tenant_id)?;

        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if user.tenant_id != team.tenant_id {
            return Err(AppError::validation(
                "Users can only join teams of their own tenant",
            ));
        }

        let membership = self
            .store
            .add_membership(&TeamMembership {
                team_id,
                user_id,
                active: true,
                created_at: Utc::now(),
            })
            .await?;

        info!(team_id = %team_id, user_id = %user_id, "Team member added");
        self.audit
            .record(ctx.event(EventPayload::Access(AccessEvent::MemberAdded {
                team_id: team_id.into_uuid(),
                user_id: user_id.into_uuid(),
            })))
            .await;
        Ok(membership)
    }

    /// Activate or deactivate a membership.
    pub async fn set_membership_active(
        &self,
        ctx: &RequestContext,
        team_id: TeamId,
        user_id: UserId,
        active: bool,
    ) -> AppResult<TeamMembership> {
        let team = self.load_team(team_id).await?;
        Self::require_admin(ctx, team.tenant_id)?;

        let membership = self
            .store
            .set_membership_active(team_id, user_id, active)
            .await?
            .ok_or_else(|| AppError::not_found("Membership not found"))?;

        info!(team_id = %team_id, user_id = %user_id, active, "Team membership changed");
        self.audit
            .record(ctx.event(EventPayload::Access(AccessEvent::MembershipChanged {
                team_id: team_id.into_uuid(),
                user_id: user_id.into_uuid(),
                active,
            })))
            .await;
        Ok(membership)
    }
}

#[cfg(test)]
mod tests {
    use cloudvault_core::error::ErrorKind;
    use cloudvault_database::MemoryStore;
    use cloudvault_entity::permission::{Action, ResourceType};
    use cloudvault_entity::principal::Role;

    use super::*;
    use crate::test_support::{context, seed_user};

    fn service(store: &MemoryStore) -> AccessAdminService {
        let store = Arc::new(store.clone());
        AccessAdminService::new(store.clone(), AuditRecorder::new(store))
    }

    #[tokio::test]
    async fn test_tenant_admin_grants_in_own_tenant_only() {
        let store = MemoryStore::new();
        let tenant = TenantId::new();
        let admin = seed_user(&store, tenant, Role::TenantAdmin).await;
        let member = seed_user(&store, tenant, Role::Teammate).await;
        let outsider = seed_user(&store, TenantId::new(), Role::Teammate).await;
        let admin_ctx = context(&store, &admin).await;
        let admin_service = service(&store);

        let req = |owner| NewPolicy {
            owner,
            resource_type: ResourceType::Bucket,
            resource_id: None,
            actions: [Action::Read].into_iter().collect(),
        };

        let policy = admin_service
            .grant_policy(&admin_ctx, req(PolicyOwner::User(member.id)))
            .await
            .unwrap();
        assert_eq!(policy.tenant_id, tenant);

        let err = admin_service
            .grant_policy(&admin_ctx, req(PolicyOwner::User(outsider.id)))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let member_ctx = context(&store, &member).await;
        let err = admin_service
            .delete_policy(&member_ctx, policy.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        admin_service.delete_policy(&admin_ctx, policy.id).await.unwrap();
        assert_eq!(store.audit_records().await.len(), 2);
    }

    #[tokio::test]
    async fn test_grant_does_not_reveal_which_owners_exist() {
        let store = MemoryStore::new();
        let tenant = TenantId::new();
        let admin = seed_user(&store, tenant, Role::TenantAdmin).await;
        let member = seed_user(&store, tenant, Role::Teammate).await;
        let platform = seed_user(&store, TenantId::new(), Role::PlatformAdmin).await;
        let admin_service = service(&store);

        let req = |owner| NewPolicy {
            owner,
            resource_type: ResourceType::Bucket,
            resource_id: None,
            actions: [Action::Read].into_iter().collect(),
        };
        let ghost = PolicyOwner::User(UserId::new());

        // A teammate sees 403 for real and unknown users alike.
        let member_ctx = context(&store, &member).await;
        for owner in [PolicyOwner::User(admin.id), ghost] {
            let err = admin_service
                .grant_policy(&member_ctx, req(owner))
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Authorization);
        }

        let admin_ctx = context(&store, &admin).await;
        let err = admin_service
            .grant_policy(&admin_ctx, req(ghost))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let platform_ctx = context(&store, &platform).await;
        let err = admin_service
            .grant_policy(&platform_ctx, req(ghost))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_grant_rejects_empty_actions() {
        let store = MemoryStore::new();
        let tenant = TenantId::new();
        let admin = seed_user(&store, tenant, Role::TenantAdmin).await;
        let member = seed_user(&store, tenant, Role::Teammate).await;
        let admin_ctx = context(&store, &admin).await;

        let err = service(&store)
            .grant_policy(
                &admin_ctx,
                NewPolicy {
                    owner: PolicyOwner::User(member.id),
                    resource_type: ResourceType::Bucket,
                    resource_id: None,
                    actions: Default::default(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_duplicate_member_conflicts() {
        let store = MemoryStore::new();
        let tenant = TenantId::new();
        let admin = seed_user(&store, tenant, Role::TenantAdmin).await;
        let member = seed_user(&store, tenant, Role::Teammate).await;
        let ctx = context(&store, &admin).await;
        let admin_service = service(&store);

        let team = admin_service.create_team(&ctx, "editors").await.unwrap();
        admin_service.add_member(&ctx, team.id, member.id).await.unwrap();
        let err = admin_service
            .add_member(&ctx, team.id, member.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let membership = admin_service
            .set_membership_active(&ctx, team.id, member.id, false)
            .await
            .unwrap();
        assert!(!membership.active);
    }

    #[tokio::test]
    async fn test_empty_action_set_rejected() {
        let store = MemoryStore::new();
        let tenant = TenantId::new();
        let admin = seed_user(&store, tenant, Role::PlatformAdmin).await;
        let ctx = context(&store, &admin).await;
        let err = service(&store)
            .grant_policy(
                &ctx,
                NewPolicy {
                    owner: PolicyOwner::User(admin.id),
                    resource_type: ResourceType::File,
                    resource_id: None,
                    actions: Default::default(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
