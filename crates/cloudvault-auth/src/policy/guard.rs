//! Maps policy denials to authorization errors.

use tracing::debug;

use cloudvault_core::error::AppError;
use cloudvault_entity::permission::{Action, ResourceDescriptor};
use cloudvault_entity::principal::Principal;

use super::engine::PolicyEngine;

/// Wraps [`PolicyEngine`] for callers that want a `Result`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyGuard {
    engine: PolicyEngine,
}

impl PolicyGuard {
    /// Creates a guard around a fresh engine.
    pub fn new() -> Self {
        Self {
            engine: PolicyEngine::new(),
        }
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// Returns `Ok(())` if allowed, or an authorization error if denied.
    pub fn require(
        &self,
        principal: &Principal,
        action: Action,
        resource: &ResourceDescriptor,
    ) -> Result<(), AppError> {
        self.require_any(principal, action, std::slice::from_ref(resource))
    }

    /// Returns `Ok(())` if any of `resources` allows `action`.
    pub fn require_any(
        &self,
        principal: &Principal,
        action: Action,
        resources: &[ResourceDescriptor],
    ) -> Result<(), AppError> {
        if self.engine.evaluate_any(principal, action, resources) {
            return Ok(());
        }
        debug!(
            user_id = %principal.id,
            action = %action,
            resource_type = ?resources.first().map(|r| r.resource_type),
            "Policy denied"
        );
        Err(AppError::authorization(format!(
            "Action '{action}' is not permitted on this resource"
        )))
    }
}

#[cfg(test)]
mod tests {
    use cloudvault_core::error::ErrorKind;
    use cloudvault_core::types::{TenantId, UserId};
    use cloudvault_entity::principal::Role;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_denial_maps_to_authorization_error() {
        let tenant = TenantId::new();
        let principal = Principal {
            id: UserId::new(),
            tenant_id: tenant,
            email: "user@example.com".to_string(),
            role: Role::Teammate,
            direct_policies: Vec::new(),
            team_memberships: Vec::new(),
        };
        let resource = ResourceDescriptor::bucket(tenant, Uuid::new_v4());
        let err = PolicyGuard::new()
            .require(&principal, Action::Upload, &resource)
            .expect_err("should deny");
        assert_eq!(err.kind, ErrorKind::Authorization);
    }
}
