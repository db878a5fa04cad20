//! Multipart upload handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use cloudvault_entity::wire::{
    AbortMultipartRequest, AbortMultipartResponse, CompleteMultipartRequest, FileResponse,
    InitiateMultipartRequest, InitiateMultipartResponse, SignPartRequest, SignPartResponse,
};

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/multipart/initiate
pub async fn initiate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<InitiateMultipartRequest>,
) -> Result<Json<InitiateMultipartResponse>, ApiError> {
    Ok(Json(state.multipart.initiate(&auth, req).await?))
}

/// POST /api/multipart/sign-part
pub async fn sign_part(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SignPartRequest>,
) -> Result<Json<SignPartResponse>, ApiError> {
    Ok(Json(state.multipart.sign_part(&auth, req).await?))
}

/// POST /api/multipart/complete
pub async fn complete(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CompleteMultipartRequest>,
) -> Result<(StatusCode, Json<FileResponse>), ApiError> {
    let file = state.multipart.complete(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(FileResponse { file })))
}

/// POST /api/multipart/abort
pub async fn abort(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<AbortMultipartRequest>,
) -> Result<Json<AbortMultipartResponse>, ApiError> {
    Ok(Json(state.multipart.abort(&auth, req).await?))
}
