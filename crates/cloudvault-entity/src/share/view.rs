//! Public, non-sensitive view of a share.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudvault_core::types::ShareId;

use super::model::Share;

/// What an unauthenticated recipient may see about a share.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicShareView {
    /// Share ID.
    pub id: ShareId,
    /// File name.
    pub file_name: String,
    /// File size in bytes.
    pub file_size: i64,
    /// Recipient email with the local part masked.
    pub to_email: String,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Downloads left.
    pub remaining_downloads: i32,
    /// Whether a password is required.
    pub password_protected: bool,
}

impl PublicShareView {
    /// Build the view of an active share.
    pub fn new(share: &Share, file_name: impl Into<String>, file_size: i64) -> Self {
        Self {
            id: share.id,
            file_name: file_name.into(),
            file_size,
            to_email: mask_email(&share.to_email),
            expires_at: share.expires_at,
            remaining_downloads: share.remaining_downloads(),
            password_protected: share.is_password_protected(),
        }
    }
}

/// Mask the local part of an email, keeping its first two characters.
///
/// `"jonathan@example.com"` becomes `"jo***@example.com"`.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let keep = if local.chars().count() > 2 { 2 } else { 1 };
            let visible: String = local.chars().take(keep).collect();
            format!("{visible}***@{domain}")
        }
        None => "***".to_string(),
    }
}
