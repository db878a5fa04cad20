//! Policy and team administration bodies.

use serde::{Deserialize, Serialize};

use cloudvault_core::types::UserId;

/// `POST /api/teams` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeamRequest {
    /// Display name.
    pub name: String,
}

/// `POST /api/teams/{id}/members` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    /// User to add.
    pub user_id: UserId,
}

/// `PUT /api/teams/{id}/members/{userId}` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMembershipRequest {
    /// New active flag.
    pub active: bool,
}
