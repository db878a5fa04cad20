//! Signs and validates share tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use cloudvault_core::config::AuthConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::types::ShareId;

use super::claims::{ShareTokenClaims, TokenPurpose};

/// A signed token together with its claims.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWT.
    pub token: String,
    /// Claims encoded in the token.
    pub claims: ShareTokenClaims,
}

/// Issues and validates magic-link and share-session tokens (HS256).
#[derive(Clone)]
pub struct ShareTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    magic_link_ttl: Duration,
    session_ttl: Duration,
}

impl std::fmt::Debug for ShareTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareTokenIssuer")
            .field("magic_link_ttl", &self.magic_link_ttl)
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}

impl ShareTokenIssuer {
    /// Creates an issuer from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            encoding_key: EncodingKey::from_secret(config.share_token_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.share_token_secret.as_bytes()),
            validation,
            magic_link_ttl: Duration::minutes(config.magic_link_ttl_minutes),
            session_ttl: Duration::hours(config.share_session_ttl_hours),
        }
    }

    /// Issues a magic-link token for `share_id`.
    pub fn issue_magic_link(&self, share_id: ShareId) -> Result<IssuedToken, AppError> {
        self.issue(share_id, TokenPurpose::MagicLink, false, self.magic_link_ttl)
    }

    /// Issues an access session for `share_id`.
    pub fn issue_session(&self, share_id: ShareId) -> Result<IssuedToken, AppError> {
        self.issue(share_id, TokenPurpose::ShareAccess, true, self.session_ttl)
    }

    /// Validates a magic-link token.
    pub fn decode_magic_link(&self, token: &str) -> Result<ShareTokenClaims, AppError> {
        let claims = self.decode_token(token)?;
        if claims.purpose != TokenPurpose::MagicLink {
            return Err(AppError::authentication(
                "Invalid token purpose: expected magic link",
            ));
        }
        Ok(claims)
    }

    /// Validates an access session token.
    pub fn decode_session(&self, token: &str) -> Result<ShareTokenClaims, AppError> {
        let claims = self.decode_token(token)?;
        if claims.purpose != TokenPurpose::ShareAccess || !claims.access {
            return Err(AppError::authentication(
                "Invalid token purpose: expected share session",
            ));
        }
        Ok(claims)
    }

    /// Session lifetime; the session cookie's max-age.
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    fn issue(
        &self,
        share_id: ShareId,
        purpose: TokenPurpose,
        access: bool,
        ttl: Duration,
    ) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let claims = ShareTokenClaims {
            sub: share_id,
            purpose,
            access,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign share token: {e}")))?;
        Ok(IssuedToken { token, claims })
    }

    fn decode_token(&self, token: &str) -> Result<ShareTokenClaims, AppError> {
        decode::<ShareTokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Share token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid share token signature")
                }
                _ => AppError::authentication(format!("Share token validation failed: {e}")),
            })
    }
}
