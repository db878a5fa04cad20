//! Turns verified identities into principal snapshots.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use cloudvault_auth::VerifiedIdentity;
use cloudvault_core::result::AppResult;
use cloudvault_database::PrincipalStore;
use cloudvault_entity::principal::{Principal, User};

/// Resolves the principal behind each authenticated request.
#[derive(Debug, Clone)]
pub struct PrincipalService {
    store: Arc<dyn PrincipalStore>,
}

impl PrincipalService {
    /// Creates a new principal service.
    pub fn new(store: Arc<dyn PrincipalStore>) -> Self {
        Self { store }
    }

    /// Load the principal for `identity`, creating the user on first sight.
    ///
    /// The identity's role claim only seeds a new record; an existing
    /// user keeps its stored role and tenant.
    pub async fn resolve(&self, identity: &VerifiedIdentity) -> AppResult<Principal> {
        let user = match self.store.find_user(identity.id).await? {
            Some(user) => user,
            None => {
                let seed = User {
                    id: identity.id,
                    tenant_id: identity.tenant_id,
                    email: identity.email.clone(),
                    role: identity.role,
                    created_at: Utc::now(),
                };
                let user = self.store.create_user_if_absent(&seed).await?;
                info!(
                    user_id = %user.id,
                    tenant_id = %user.tenant_id,
                    role = %user.role,
                    "Principal created on first sight"
                );
                user
            }
        };
        self.store.load_principal(&user).await
    }
}

#[cfg(test)]
mod tests {
    use cloudvault_core::types::{TenantId, UserId};
    use cloudvault_database::MemoryStore;
    use cloudvault_entity::principal::Role;

    use super::*;

    #[tokio::test]
    async fn test_stored_role_wins_over_claim() {
        let store = Arc::new(MemoryStore::new());
        let service = PrincipalService::new(store);
        let mut identity = VerifiedIdentity {
            id: UserId::new(),
            email: "lea@example.com".to_string(),
            role: Role::Teammate,
            tenant_id: TenantId::new(),
        };

        let first = service.resolve(&identity).await.unwrap();
        assert_eq!(first.role, Role::Teammate);

        identity.role = Role::PlatformAdmin;
        let second = service.resolve(&identity).await.unwrap();
        assert_eq!(second.role, Role::Teammate);
    }
}
