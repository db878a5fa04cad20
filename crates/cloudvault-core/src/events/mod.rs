//! Domain events emitted by CloudVault operations.
//!
//! Events are handed to the audit sink after each state change. Every
//! event carries the tenant it happened in so audit records stay
//! tenant-scoped.

pub mod access;
pub mod file;
pub mod share;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use access::AccessEvent;
pub use file::FileEvent;
pub use share::ShareEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Tenant the event belongs to.
    pub tenant_id: Option<Uuid>,
    /// The principal who caused the event, if any. Anonymous share
    /// recipients have none.
    pub actor_id: Option<Uuid>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// An object or bucket event.
    File(FileEvent),
    /// A share lifecycle event.
    Share(ShareEvent),
    /// A policy or team membership event.
    Access(AccessEvent),
}

impl EventPayload {
    /// Dotted action name stored in the audit log, e.g. `share.revoked`.
    pub fn action(&self) -> String {
        match self {
            Self::File(e) => format!("file.{}", e.name()),
            Self::Share(e) => format!("share.{}", e.name()),
            Self::Access(e) => format!("access.{}", e.name()),
        }
    }

    /// Resource type and id the event is about.
    pub fn resource(&self) -> (&'static str, Uuid) {
        match self {
            Self::File(e) => e.resource(),
            Self::Share(e) => ("share", e.share_id()),
            Self::Access(e) => e.resource(),
        }
    }
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(tenant_id: Option<Uuid>, actor_id: Option<Uuid>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            tenant_id,
            actor_id,
            payload,
        }
    }
}
