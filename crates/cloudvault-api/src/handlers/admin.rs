//! Policy and team administration handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use cloudvault_core::types::{PolicyId, TeamId, UserId};
use cloudvault_entity::permission::{NewPolicy, Policy};
use cloudvault_entity::principal::{Team, TeamMembership};
use cloudvault_entity::wire::{AddMemberRequest, CreateTeamRequest, SetMembershipRequest};

use crate::dto::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/policies
pub async fn grant_policy(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<NewPolicy>,
) -> Result<(StatusCode, Json<ApiResponse<Policy>>), ApiError> {
    let policy = state.access_admin.grant_policy(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(policy))))
}

/// DELETE /api/policies/{id}
pub async fn delete_policy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .access_admin
        .delete_policy(&auth, PolicyId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/teams
pub async fn create_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Team>>), ApiError> {
    let team = state.access_admin.create_team(&auth, &req.name).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(team))))
}

/// POST /api/teams/{id}/members
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TeamMembership>>), ApiError> {
    let membership = state
        .access_admin
        .add_member(&auth, TeamId::from_uuid(id), req.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(membership))))
}

/// PUT /api/teams/{id}/members/{user_id}
pub async fn set_membership(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((team_id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<SetMembershipRequest>,
) -> Result<Json<ApiResponse<TeamMembership>>, ApiError> {
    let membership = state
        .access_admin
        .set_membership_active(
            &auth,
            TeamId::from_uuid(team_id),
            UserId::from_uuid(user_id),
            req.active,
        )
        .await?;
    Ok(Json(ApiResponse::ok(membership)))
}
