//! Single-shot presign and registration handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use cloudvault_entity::wire::{FileResponse, PresignRequest, PresignResponse, RegisterFileRequest};

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/presign
pub async fn presign(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<PresignRequest>,
) -> Result<Json<PresignResponse>, ApiError> {
    let response = state.presign.presign(&auth, req).await?;
    Ok(Json(response))
}

/// POST /api/files/register
pub async fn register(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<RegisterFileRequest>,
) -> Result<(StatusCode, Json<FileResponse>), ApiError> {
    let file = state.presign.register(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(FileResponse { file })))
}
