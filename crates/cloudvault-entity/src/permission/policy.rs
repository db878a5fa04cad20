//! Policy value type.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use cloudvault_core::types::{PolicyId, TeamId, TenantId, UserId};

use super::action::Action;
use super::resource::{ResourceDescriptor, ResourceType};

/// Who a policy is granted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum PolicyOwner {
    /// Granted to one user.
    User(UserId),
    /// Granted to every active member of a team.
    Team(TeamId),
}

impl PolicyOwner {
    /// `"user"` or `"team"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Team(_) => "team",
        }
    }

    /// The owning user or team ID.
    pub fn id(&self) -> Uuid {
        match self {
            Self::User(id) => id.into_uuid(),
            Self::Team(id) => id.into_uuid(),
        }
    }
}

/// An immutable grant of actions over a resource type, optionally narrowed
/// to one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Policy ID.
    pub id: PolicyId,
    /// Tenant the grant lives in.
    pub tenant_id: TenantId,
    /// User or team holding the grant.
    pub owner: PolicyOwner,
    /// Resource type the grant covers.
    pub resource_type: ResourceType,
    /// Specific resource, or `None` for every resource of the type.
    pub resource_id: Option<Uuid>,
    /// Granted actions.
    pub actions: BTreeSet<Action>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Policy {
    /// Whether this policy grants `action` on `resource`.
    ///
    /// Tenant isolation is not checked here; the engine does that first.
    pub fn matches(&self, action: Action, resource: &ResourceDescriptor) -> bool {
        self.resource_type == resource.resource_type
            && self
                .resource_id
                .is_none_or(|id| id == resource.resource_id)
            && self.actions.contains(&action)
    }

    /// Whether the policy covers every resource of its type.
    pub fn is_wildcard(&self) -> bool {
        self.resource_id.is_none()
    }
}

/// Data required to grant a new policy.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPolicy {
    /// User or team receiving the grant.
    pub owner: PolicyOwner,
    /// Resource type.
    pub resource_type: ResourceType,
    /// Specific resource or wildcard.
    #[serde(default)]
    pub resource_id: Option<Uuid>,
    /// Actions to grant; must not be empty.
    #[validate(length(min = 1, message = "A policy must grant at least one action"))]
    pub actions: BTreeSet<Action>,
}

impl NewPolicy {
    /// Build the stored policy for `tenant_id`.
    pub fn into_policy(self, tenant_id: TenantId) -> Policy {
        Policy {
            id: PolicyId::new(),
            tenant_id,
            owner: self.owner,
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            actions: self.actions,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(resource_id: Option<Uuid>, actions: &[Action]) -> Policy {
        NewPolicy {
            owner: PolicyOwner::User(UserId::new()),
            resource_type: ResourceType::Bucket,
            resource_id,
            actions: actions.iter().copied().collect(),
        }
        .into_policy(TenantId::new())
    }

    #[test]
    fn test_specific_policy_matches_only_its_resource() {
        let tenant = TenantId::new();
        let b1 = Uuid::new_v4();
        let p = policy(Some(b1), &[Action::Read]);
        assert!(p.matches(Action::Read, &ResourceDescriptor::bucket(tenant, b1)));
        assert!(!p.matches(Action::Read, &ResourceDescriptor::bucket(tenant, Uuid::new_v4())));
        assert!(!p.matches(Action::Write, &ResourceDescriptor::bucket(tenant, b1)));
    }

    #[test]
    fn test_wildcard_matches_every_id_of_type() {
        let tenant = TenantId::new();
        let p = policy(None, &[Action::List]);
        assert!(p.is_wildcard());
        for _ in 0..5 {
            assert!(p.matches(Action::List, &ResourceDescriptor::bucket(tenant, Uuid::new_v4())));
        }
        assert!(!p.matches(Action::List, &ResourceDescriptor::file(tenant, Uuid::new_v4())));
    }

    #[test]
    fn test_new_policy_requires_an_action() {
        let grant = NewPolicy {
            owner: PolicyOwner::Team(TeamId::new()),
            resource_type: ResourceType::Bucket,
            resource_id: None,
            actions: BTreeSet::new(),
        };
        assert!(grant.validate().is_err());
    }

    #[test]
    fn test_owner_serializes_tagged() {
        let team = TeamId::new();
        let json = serde_json::to_value(PolicyOwner::Team(team)).expect("serialize");
        assert_eq!(json["kind"], "team");
        assert_eq!(json["id"], team.to_string());
    }
}
