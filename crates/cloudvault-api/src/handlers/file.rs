//! File handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use cloudvault_core::types::FileId;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.files.delete_file(&auth, FileId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
