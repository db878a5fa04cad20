//! `AuthUser` extractor: verifies the bearer token and resolves the principal.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use cloudvault_core::error::AppError;
use cloudvault_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated principal available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The token after `Bearer `, if the header carries one.
pub(crate) fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::authentication("Missing bearer token"))?;

        let identity = state.identity.verify(token).await?;
        let principal = state.principals.resolve(&identity).await?;

        Ok(AuthUser(RequestContext::new(principal)))
    }
}
