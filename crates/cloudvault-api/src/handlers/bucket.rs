//! Bucket handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use cloudvault_core::traits::ObjectPage;
use cloudvault_core::types::BucketId;
use cloudvault_entity::bucket::Bucket;
use cloudvault_entity::wire::{CreateBucketRequest, ListObjectsQuery};

use crate::dto::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/buckets
pub async fn create_bucket(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateBucketRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Bucket>>), ApiError> {
    let bucket = state.files.create_bucket(&auth, &req.name).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(bucket))))
}

/// GET /api/buckets
pub async fn list_buckets(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Bucket>>>, ApiError> {
    let buckets = state.files.list_buckets(&auth).await?;
    Ok(Json(ApiResponse::ok(buckets)))
}

/// GET /api/buckets/{id}/objects
pub async fn list_objects(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ListObjectsQuery>,
) -> Result<Json<ApiResponse<ObjectPage>>, ApiError> {
    let page = state
        .files
        .list_objects(&auth, BucketId::from_uuid(id), query)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}
