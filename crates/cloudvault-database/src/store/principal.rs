//! Users, teams, memberships, and policies.

use async_trait::async_trait;

use cloudvault_core::result::AppResult;
use cloudvault_core::types::{PolicyId, TeamId, UserId};
use cloudvault_entity::permission::Policy;
use cloudvault_entity::principal::{Principal, Team, TeamMembership, User};

/// Persistence for principals and their grants.
#[async_trait]
pub trait PrincipalStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by ID.
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>>;

    /// Insert `user` unless a record with its ID exists; return the stored
    /// record either way.
    async fn create_user_if_absent(&self, user: &User) -> AppResult<User>;

    /// Assemble the principal snapshot for `user`: direct policies plus
    /// every team membership with its team's policies.
    async fn load_principal(&self, user: &User) -> AppResult<Principal>;

    /// Store a policy.
    async fn insert_policy(&self, policy: &Policy) -> AppResult<Policy>;

    /// Find a policy by ID.
    async fn find_policy(&self, id: PolicyId) -> AppResult<Option<Policy>>;

    /// Delete a policy. Returns `false` if it did not exist.
    async fn delete_policy(&self, id: PolicyId) -> AppResult<bool>;

    /// Create a team. A duplicate name within the tenant is a conflict.
    async fn insert_team(&self, team: &Team) -> AppResult<Team>;

    /// Find a team by ID.
    async fn find_team(&self, id: TeamId) -> AppResult<Option<Team>>;

    /// Add a membership. An existing membership is a conflict.
    async fn add_membership(&self, membership: &TeamMembership) -> AppResult<TeamMembership>;

    /// Set a membership's active flag. `None` if no such membership.
    async fn set_membership_active(
        &self,
        team_id: TeamId,
        user_id: UserId,
        active: bool,
    ) -> AppResult<Option<TeamMembership>>;
}
