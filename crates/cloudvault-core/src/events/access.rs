//! Policy and team membership events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to access administration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AccessEvent {
    /// A policy was granted.
    PolicyGranted {
        /// The policy ID.
        policy_id: Uuid,
        /// `"user"` or `"team"`.
        owner_kind: String,
        /// Owning user or team.
        owner_id: Uuid,
        /// Granted actions.
        actions: Vec<String>,
    },
    /// A policy was deleted.
    PolicyDeleted {
        /// The policy ID.
        policy_id: Uuid,
    },
    /// A user joined a team.
    MemberAdded {
        /// The team ID.
        team_id: Uuid,
        /// The user ID.
        user_id: Uuid,
    },
    /// A membership was activated or deactivated.
    MembershipChanged {
        /// The team ID.
        team_id: Uuid,
        /// The user ID.
        user_id: Uuid,
        /// New active flag.
        active: bool,
    },
}

impl AccessEvent {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::PolicyGranted { .. } => "policy_granted",
            Self::PolicyDeleted { .. } => "policy_deleted",
            Self::MemberAdded { .. } => "member_added",
            Self::MembershipChanged { .. } => "membership_changed",
        }
    }

    pub(crate) fn resource(&self) -> (&'static str, Uuid) {
        match self {
            Self::PolicyGranted { policy_id, .. } | Self::PolicyDeleted { policy_id } => {
                ("policy", *policy_id)
            }
            Self::MemberAdded { team_id, .. } | Self::MembershipChanged { team_id, .. } => {
                ("team", *team_id)
            }
        }
    }
}
