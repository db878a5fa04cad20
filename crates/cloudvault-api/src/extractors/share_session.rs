//! Share-session token carried by a cookie or a bearer header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use cloudvault_core::error::AppError;

use super::auth::bearer_token;
use crate::error::ShareError;

/// Cookie set by the magic-link verification redirect.
pub const SHARE_SESSION_COOKIE: &str = "share_session";

/// Raw share-session token. The cookie wins over the header.
#[derive(Debug, Clone)]
pub struct ShareSession(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ShareSession {
    type Rejection = ShareError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(cookie) = jar.get(SHARE_SESSION_COOKIE) {
            return Ok(Self(cookie.value().to_string()));
        }
        bearer_token(parts)
            .map(|t| Self(t.to_string()))
            .ok_or_else(|| AppError::authentication("Missing share session").into())
    }
}
