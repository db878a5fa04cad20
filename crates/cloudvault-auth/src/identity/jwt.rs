//! HS256 JWT identity verification.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cloudvault_core::config::AuthConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::{TenantId, UserId};
use cloudvault_entity::principal::Role;

use super::provider::{IdentityProvider, VerifiedIdentity};

/// Claims expected in identity-provider tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject: the user ID.
    pub sub: Uuid,
    /// Email address.
    pub email: String,
    /// Role claim.
    pub role: Role,
    /// Tenant claim.
    pub tenant_id: Uuid,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Issued-at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

/// Verifies identity tokens signed with a shared HMAC secret.
#[derive(Clone)]
pub struct JwtIdentityProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: Option<String>,
}

impl std::fmt::Debug for JwtIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIdentityProvider")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtIdentityProvider {
    /// Creates a provider from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;
        let issuer = (!config.identity_issuer.is_empty()).then(|| config.identity_issuer.clone());
        if let Some(iss) = &issuer {
            validation.set_issuer(&[iss.as_str()]);
        }

        Self {
            encoding_key: EncodingKey::from_secret(config.identity_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.identity_secret.as_bytes()),
            validation,
            issuer,
        }
    }

    /// Signs a token for `identity`. Used by local tooling and tests that
    /// stand in for the real identity provider.
    pub fn issue(&self, identity: &VerifiedIdentity, ttl: Duration) -> AppResult<String> {
        let now = Utc::now();
        let claims = IdentityClaims {
            sub: identity.id.into_uuid(),
            email: identity.email.clone(),
            role: identity.role,
            tenant_id: identity.tenant_id.into_uuid(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign identity token: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify(&self, bearer: &str) -> AppResult<VerifiedIdentity> {
        let claims = decode::<IdentityClaims>(bearer, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                _ => AppError::authentication(format!("Token validation failed: {e}")),
            })?;

        Ok(VerifiedIdentity {
            id: UserId::from_uuid(claims.sub),
            email: claims.email,
            role: claims.role,
            tenant_id: TenantId::from_uuid(claims.tenant_id),
        })
    }
}
