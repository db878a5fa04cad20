//! Identity provider seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cloudvault_core::result::AppResult;
use cloudvault_core::types::{TenantId, UserId};
use cloudvault_entity::principal::Role;

/// A principal as asserted by the identity provider.
///
/// `role` only seeds the stored record the first time the principal is
/// seen; the stored role wins afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedIdentity {
    /// Subject.
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Role claim.
    pub role: Role,
    /// Tenant claim.
    pub tenant_id: TenantId,
}

/// Verifies bearer credentials issued by an external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Verify a bearer token and return the identity it asserts.
    async fn verify(&self, bearer: &str) -> AppResult<VerifiedIdentity>;
}
