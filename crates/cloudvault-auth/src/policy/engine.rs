//! The policy engine: a pure allow/deny predicate.

use cloudvault_entity::permission::{Action, ResourceDescriptor};
use cloudvault_entity::principal::{Principal, Role};

/// Evaluates whether a principal may perform an action on a resource.
///
/// Stateless; evaluation reads only the principal snapshot passed in.
/// Rules, first match wins:
///
/// 1. platform admins are always allowed;
/// 2. a resource in another tenant is denied;
/// 3. tenant admins are allowed within their tenant;
/// 4. a matching direct policy allows;
/// 5. a matching policy of an active team membership allows;
/// 6. otherwise deny.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine;

impl PolicyEngine {
    /// Creates a new engine.
    pub fn new() -> Self {
        Self
    }

    /// Returns `true` if `principal` may perform `action` on `resource`.
    pub fn evaluate(
        &self,
        principal: &Principal,
        action: Action,
        resource: &ResourceDescriptor,
    ) -> bool {
        if principal.role == Role::PlatformAdmin {
            return true;
        }
        if resource.tenant_id != principal.tenant_id {
            return false;
        }
        if principal.role == Role::TenantAdmin {
            return true;
        }
        if principal
            .direct_policies
            .iter()
            .any(|p| p.matches(action, resource))
        {
            return true;
        }
        principal
            .team_memberships
            .iter()
            .filter(|m| m.active)
            .flat_map(|m| m.policies.iter())
            .any(|p| p.matches(action, resource))
    }

    /// Returns `true` if any of `resources` allows `action`.
    ///
    /// Used where a resource inherits grants from its container, e.g. a
    /// file from its bucket.
    pub fn evaluate_any(
        &self,
        principal: &Principal,
        action: Action,
        resources: &[ResourceDescriptor],
    ) -> bool {
        resources
            .iter()
            .any(|resource| self.evaluate(principal, action, resource))
    }
}

#[cfg(test)]
mod tests {
    use cloudvault_core::types::{TeamId, TenantId, UserId};
    use cloudvault_entity::permission::{NewPolicy, Policy, PolicyOwner, ResourceType};
    use cloudvault_entity::principal::TeamGrant;
    use uuid::Uuid;

    use super::*;

    fn principal(role: Role, tenant_id: TenantId) -> Principal {
        Principal {
            id: UserId::new(),
            tenant_id,
            email: "user@example.com".to_string(),
            role,
            direct_policies: Vec::new(),
            team_memberships: Vec::new(),
        }
    }

    fn bucket_policy(tenant_id: TenantId, bucket: Option<Uuid>, actions: &[Action]) -> Policy {
        NewPolicy {
            owner: PolicyOwner::User(UserId::new()),
            resource_type: ResourceType::Bucket,
            resource_id: bucket,
            actions: actions.iter().copied().collect(),
        }
        .into_policy(tenant_id)
    }

    #[test]
    fn test_platform_admin_always_allowed() {
        let engine = PolicyEngine::new();
        let admin = principal(Role::PlatformAdmin, TenantId::new());
        for action in Action::ALL {
            let other_tenant = ResourceDescriptor::bucket(TenantId::new(), Uuid::new_v4());
            assert!(engine.evaluate(&admin, action, &other_tenant));
        }
    }

    #[test]
    fn test_cross_tenant_denied_for_everyone_else() {
        let engine = PolicyEngine::new();
        let tenant = TenantId::new();
        let foreign = ResourceDescriptor::bucket(TenantId::new(), Uuid::new_v4());

        let tenant_admin = principal(Role::TenantAdmin, tenant);
        assert!(!engine.evaluate(&tenant_admin, Action::Read, &foreign));

        let mut teammate = principal(Role::Teammate, tenant);
        teammate
            .direct_policies
            .push(bucket_policy(tenant, None, &Action::ALL));
        assert!(!engine.evaluate(&teammate, Action::Read, &foreign));
    }

    #[test]
    fn test_tenant_admin_allowed_in_own_tenant() {
        let engine = PolicyEngine::new();
        let tenant = TenantId::new();
        let admin = principal(Role::TenantAdmin, tenant);
        let resource = ResourceDescriptor::file(tenant, Uuid::new_v4());
        assert!(engine.evaluate(&admin, Action::Delete, &resource));
    }

    #[test]
    fn test_teammate_read_allowed_write_denied() {
        let engine = PolicyEngine::new();
        let t1 = TenantId::new();
        let b1 = Uuid::new_v4();
        let mut teammate = principal(Role::Teammate, t1);
        teammate
            .direct_policies
            .push(bucket_policy(t1, Some(b1), &[Action::Read]));

        let resource = ResourceDescriptor::bucket(t1, b1);
        assert!(engine.evaluate(&teammate, Action::Read, &resource));
        assert!(!engine.evaluate(&teammate, Action::Write, &resource));
    }

    #[test]
    fn test_wildcard_policy_matches_any_bucket() {
        let engine = PolicyEngine::new();
        let tenant = TenantId::new();
        let mut teammate = principal(Role::Teammate, tenant);
        teammate
            .direct_policies
            .push(bucket_policy(tenant, None, &[Action::List]));

        for _ in 0..10 {
            let resource = ResourceDescriptor::bucket(tenant, Uuid::new_v4());
            assert!(engine.evaluate(&teammate, Action::List, &resource));
        }
    }

    #[test]
    fn test_only_active_team_memberships_grant() {
        let engine = PolicyEngine::new();
        let tenant = TenantId::new();
        let bucket = Uuid::new_v4();
        let resource = ResourceDescriptor::bucket(tenant, bucket);

        let mut teammate = principal(Role::Teammate, tenant);
        teammate.team_memberships.push(TeamGrant {
            team_id: TeamId::new(),
            active: false,
            policies: vec![bucket_policy(tenant, Some(bucket), &[Action::Upload])],
        });
        assert!(!engine.evaluate(&teammate, Action::Upload, &resource));

        teammate.team_memberships[0].active = true;
        assert!(engine.evaluate(&teammate, Action::Upload, &resource));
    }

    #[test]
    fn test_no_policies_denies() {
        let engine = PolicyEngine::new();
        let tenant = TenantId::new();
        let teammate = principal(Role::Teammate, tenant);
        let resource = ResourceDescriptor::bucket(tenant, Uuid::new_v4());
        assert!(!engine.evaluate(&teammate, Action::Read, &resource));
    }

    #[test]
    fn test_evaluate_any_uses_container_grant() {
        let engine = PolicyEngine::new();
        let tenant = TenantId::new();
        let bucket = Uuid::new_v4();
        let mut teammate = principal(Role::Teammate, tenant);
        teammate
            .direct_policies
            .push(bucket_policy(tenant, Some(bucket), &[Action::Share]));

        let file = ResourceDescriptor::file(tenant, Uuid::new_v4());
        let container = ResourceDescriptor::bucket(tenant, bucket);
        assert!(!engine.evaluate(&teammate, Action::Share, &file));
        assert!(engine.evaluate_any(&teammate, Action::Share, &[file, container]));
    }
}
