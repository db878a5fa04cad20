//! Outbound email sink.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// What an outbound email is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    /// Tells a recipient a file was shared with them.
    ShareInvitation,
    /// Carries a magic link for share authentication.
    MagicLink,
}

/// An email waiting to be delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundEmail {
    /// Purpose of the email.
    pub kind: EmailKind,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Delivers outbound email.
///
/// Callers dispatch fire-and-forget; a failing sink never fails the
/// operation that produced the email.
#[async_trait]
pub trait NotificationSink: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver one email.
    async fn send(&self, email: OutboundEmail) -> AppResult<()>;
}
