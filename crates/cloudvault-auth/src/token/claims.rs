//! Claims carried by share tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cloudvault_core::types::ShareId;

/// What a share token may be used for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Short-lived token mailed to the recipient; only exchangeable for a session.
    MagicLink,
    /// Longer-lived session that authorizes downloads.
    ShareAccess,
}

/// JWT claims for share tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareTokenClaims {
    /// Subject: the share ID.
    pub sub: ShareId,
    /// Token purpose.
    pub purpose: TokenPurpose,
    /// Set on access sessions.
    #[serde(default)]
    pub access: bool,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Token ID, used to make magic links single-use.
    pub jti: Uuid,
}

impl ShareTokenClaims {
    /// The share this token is bound to.
    pub fn share_id(&self) -> ShareId {
        self.sub
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}
