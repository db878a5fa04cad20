//! Public share endpoints reached by external recipients.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Deserialize;
use uuid::Uuid;

use cloudvault_core::types::ShareId;
use cloudvault_entity::share::PublicShareView;
use cloudvault_entity::wire::ShareAuthRequest;

use crate::dto::MessageResponse;
use crate::error::ShareError;
use crate::extractors::{SHARE_SESSION_COOKIE, ShareSession};
use crate::state::AppState;

/// Query string of the magic-link URL.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    /// Magic-link token.
    pub token: String,
}

/// GET /shares/{id}
pub async fn view_share(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicShareView>, ShareError> {
    let view = state.share_access.view(ShareId::from_uuid(id)).await?;
    Ok(Json(view))
}

/// POST /shares/{id}/auth
pub async fn authenticate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ShareAuthRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ShareError> {
    state
        .share_access
        .authenticate(ShareId::from_uuid(id), req)
        .await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("A sign-in link has been sent")),
    ))
}

/// GET /shares/verify?token=
///
/// The session cookie lives as long as the session token.
pub async fn verify(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<VerifyQuery>,
) -> Result<(CookieJar, Redirect), ShareError> {
    let session = state.share_access.verify(&query.token).await?;
    let share_id = session.claims.share_id();

    let max_age = time::Duration::seconds(state.tokens.session_ttl().num_seconds());
    let cookie = Cookie::build((SHARE_SESSION_COOKIE, session.token))
        .path("/shares")
        .http_only(true)
        .secure(state.config.auth.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build();
    Ok((jar.add(cookie), Redirect::to(&format!("/shares/{share_id}"))))
}

/// GET /shares/{id}/download
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ShareSession(session): ShareSession,
) -> Result<Redirect, ShareError> {
    let signed = state
        .share_access
        .download(ShareId::from_uuid(id), &session)
        .await?;
    Ok(Redirect::to(&signed.url))
}
