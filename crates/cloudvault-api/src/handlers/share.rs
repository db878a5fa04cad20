//! Share management handlers for authenticated creators.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use cloudvault_core::types::ShareId;
use cloudvault_entity::share::Share;
use cloudvault_entity::wire::{CreateShareRequest, CreateShareResponse};

use crate::dto::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/shares
pub async fn create_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateShareRequest>,
) -> Result<(StatusCode, Json<CreateShareResponse>), ApiError> {
    let created = state.shares.create(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/shares
pub async fn list_shares(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Share>>>, ApiError> {
    let shares = state.shares.list(&auth).await?;
    Ok(Json(ApiResponse::ok(shares)))
}

/// DELETE /api/shares/{id}
pub async fn revoke_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Share>>, ApiError> {
    let share = state.shares.revoke(&auth, ShareId::from_uuid(id)).await?;
    Ok(Json(ApiResponse::ok(share)))
}
