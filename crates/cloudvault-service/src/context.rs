//! Request context carrying the authenticated principal.

use chrono::{DateTime, Utc};

use cloudvault_core::events::{DomainEvent, EventPayload};
use cloudvault_core::types::{TenantId, UserId};
use cloudvault_entity::principal::Principal;

/// Context for the current authenticated request.
///
/// Built once per request from the verified identity and passed into
/// every service method, so each operation evaluates the same snapshot.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The acting principal with its policies.
    pub principal: Principal,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for `principal`.
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            request_time: Utc::now(),
        }
    }

    /// The acting user.
    pub fn user_id(&self) -> UserId {
        self.principal.id
    }

    /// The acting user's tenant.
    pub fn tenant_id(&self) -> TenantId {
        self.principal.tenant_id
    }

    /// An event attributed to this principal in its tenant.
    pub fn event(&self, payload: EventPayload) -> DomainEvent {
        DomainEvent::new(
            Some(self.tenant_id().into_uuid()),
            Some(self.user_id().into_uuid()),
            payload,
        )
    }
}
