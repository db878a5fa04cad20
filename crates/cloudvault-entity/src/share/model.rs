//! Share entity model and its state rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cloudvault_core::AppError;
use cloudvault_core::types::{FileId, ShareId, TenantId, UserId};

/// Lifecycle state of a share. `Expired` and `Revoked` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ShareStatus {
    /// Usable.
    Active,
    /// Past its expiry or out of downloads.
    Expired,
    /// Withdrawn by its creator or an administrator.
    Revoked,
}

impl ShareStatus {
    /// Return the status as its stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Expired => "EXPIRED",
            Self::Revoked => "REVOKED",
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Why a share can no longer be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    /// The expiry timestamp passed.
    Expired,
    /// Every allowed download was used.
    LimitReached,
    /// The share was revoked.
    Revoked,
}

impl TerminalReason {
    /// Wire string sent to share recipients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::LimitReached => "limit_reached",
            Self::Revoked => "revoked",
        }
    }

    /// The error reported for this reason.
    pub fn into_error(self) -> AppError {
        match self {
            Self::Expired => AppError::expired("This share link has expired"),
            Self::LimitReached => {
                AppError::limit_reached("This share link has reached its download limit")
            }
            Self::Revoked => AppError::revoked("This share link has been revoked"),
        }
    }
}

/// A time- and usage-limited external access grant to one file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    /// Share ID.
    pub id: ShareId,
    /// Shared file.
    pub file_id: FileId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Creator.
    pub created_by: UserId,
    /// Recipient email.
    pub to_email: String,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Download quota.
    pub download_limit: i32,
    /// Downloads consumed.
    pub downloads: i32,
    /// Argon2 hash of the share password.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Lifecycle state.
    pub status: ShareStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last successful download.
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// When the share was revoked.
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Share {
    /// Whether a password must be supplied to authenticate.
    pub fn is_password_protected(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Reason a non-active share is unusable, derived from persisted state.
    ///
    /// An expired share that used up its quota reports `LimitReached`.
    pub fn terminal_reason(&self) -> Option<TerminalReason> {
        match self.status {
            ShareStatus::Active => None,
            ShareStatus::Revoked => Some(TerminalReason::Revoked),
            ShareStatus::Expired if self.downloads >= self.download_limit => {
                Some(TerminalReason::LimitReached)
            }
            ShareStatus::Expired => Some(TerminalReason::Expired),
        }
    }

    /// For an active share, the transition `now` requires, if any.
    pub fn due_transition(&self, now: DateTime<Utc>) -> Option<TerminalReason> {
        if self.status != ShareStatus::Active {
            return None;
        }
        if now > self.expires_at {
            Some(TerminalReason::Expired)
        } else if self.downloads >= self.download_limit {
            Some(TerminalReason::LimitReached)
        } else {
            None
        }
    }

    /// Downloads left before the quota is used up.
    pub fn remaining_downloads(&self) -> i32 {
        (self.download_limit - self.downloads).max(0)
    }
}

/// Data required to create a share.
#[derive(Debug, Clone)]
pub struct NewShare {
    /// Shared file.
    pub file_id: FileId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Creator.
    pub created_by: UserId,
    /// Recipient email.
    pub to_email: String,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Download quota.
    pub download_limit: i32,
    /// Argon2 hash of the password.
    pub password_hash: Option<String>,
}

impl NewShare {
    /// Build the stored record in the `ACTIVE` state.
    pub fn into_share(self) -> Share {
        Share {
            id: ShareId::new(),
            file_id: self.file_id,
            tenant_id: self.tenant_id,
            created_by: self.created_by,
            to_email: self.to_email,
            expires_at: self.expires_at,
            download_limit: self.download_limit,
            downloads: 0,
            password_hash: self.password_hash,
            status: ShareStatus::Active,
            created_at: Utc::now(),
            last_accessed_at: None,
            revoked_at: None,
        }
    }
}
