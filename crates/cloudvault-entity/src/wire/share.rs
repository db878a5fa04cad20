//! Share bodies.

use serde::{Deserialize, Serialize};
use validator::Validate;

use cloudvault_core::types::FileId;

use crate::share::Share;

/// `POST /api/shares` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareRequest {
    /// File to share.
    pub file_id: FileId,
    /// Recipient email.
    #[validate(email(message = "must be an email address"))]
    pub to_email: String,
    /// Days until expiry.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub expiry_days: Option<i64>,
    /// Download quota, as a number or numeric string. Anything else falls
    /// back to the configured default.
    #[serde(default)]
    pub download_limit: Option<serde_json::Value>,
    /// Optional password.
    #[serde(default)]
    pub password: Option<String>,
}

impl CreateShareRequest {
    /// The download limit if it parses to a positive integer.
    pub fn parsed_download_limit(&self) -> Option<i32> {
        let limit = match self.download_limit.as_ref()? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }?;
        i32::try_from(limit).ok().filter(|l| *l > 0)
    }
}

/// `POST /api/shares` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareResponse {
    /// The created share.
    pub share: Share,
    /// Public landing URL.
    pub share_url: String,
}

/// `POST /shares/{id}/auth` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareAuthRequest {
    /// Email the share was sent to.
    pub email: String,
    /// Password, when the share is protected.
    #[serde(default)]
    pub password: Option<String>,
}

/// Body returned for a share that can no longer be used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareDeniedResponse {
    /// `expired`, `limit_reached`, or `revoked`.
    pub reason: String,
    /// Human-readable message.
    pub message: String,
}
