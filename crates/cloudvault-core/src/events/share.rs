//! Share lifecycle events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to share links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShareEvent {
    /// A share was created.
    Created {
        /// The share ID.
        share_id: Uuid,
        /// The shared file.
        file_id: Uuid,
        /// Download quota.
        download_limit: i32,
        /// Whether a password protects the share.
        password_protected: bool,
    },
    /// A magic link was issued to the recipient.
    MagicLinkIssued {
        /// The share ID.
        share_id: Uuid,
    },
    /// A magic link was exchanged for an access session.
    SessionIssued {
        /// The share ID.
        share_id: Uuid,
    },
    /// The shared file was downloaded.
    Downloaded {
        /// The share ID.
        share_id: Uuid,
        /// Download count after this download.
        download_count: i32,
        /// Download quota.
        download_limit: i32,
    },
    /// The share moved to EXPIRED.
    Expired {
        /// The share ID.
        share_id: Uuid,
        /// `"time"` or `"download_limit"`.
        reason: String,
    },
    /// The share was revoked.
    Revoked {
        /// The share ID.
        share_id: Uuid,
    },
}

impl ShareEvent {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::MagicLinkIssued { .. } => "magic_link_issued",
            Self::SessionIssued { .. } => "session_issued",
            Self::Downloaded { .. } => "downloaded",
            Self::Expired { .. } => "expired",
            Self::Revoked { .. } => "revoked",
        }
    }

    /// The share this event is about.
    pub fn share_id(&self) -> Uuid {
        match self {
            Self::Created { share_id, .. }
            | Self::MagicLinkIssued { share_id }
            | Self::SessionIssued { share_id }
            | Self::Downloaded { share_id, .. }
            | Self::Expired { share_id, .. }
            | Self::Revoked { share_id } => *share_id,
        }
    }
}
