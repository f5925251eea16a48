//! User registry - binds a user principal to its key material
//!
//! The caller must already hold the user role (an administrator also
//! qualifies). A principal registers once; its `user_id` never changes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cipherbank_types::{Principal, RegistryError, RegistryEvent, Result, Role, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::access::RoleAuthority;
use crate::events::EventBus;
use crate::registry::ProfileTable;

/// A registered user's identity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Standing public key
    #[serde(with = "hex::serde")]
    pub public_key: Vec<u8>,
    /// Homomorphic-encryption public key material
    #[serde(with = "hex::serde")]
    pub fhe_public_key: Vec<u8>,
    /// Auxiliary evaluation key material
    #[serde(with = "hex::serde")]
    pub server_key: Vec<u8>,
    pub is_active: bool,
    pub user_id: UserId,
    pub registered_at: DateTime<Utc>,
}

/// The user registry
#[derive(Clone)]
pub struct UserRegistry {
    access: Arc<dyn RoleAuthority>,
    events: EventBus,
    table: Arc<RwLock<ProfileTable<UserProfile>>>,
}

impl UserRegistry {
    pub fn new(access: Arc<dyn RoleAuthority>, events: EventBus) -> Self {
        Self {
            access,
            events,
            table: Arc::new(RwLock::new(ProfileTable::new("user"))),
        }
    }

    /// Register the caller's key material.
    ///
    /// `public_key` and `fhe_public_key` must be non-empty; `server_key` may
    /// be empty when the key service did not produce one.
    pub async fn register_user(
        &self,
        caller: &Principal,
        public_key: Vec<u8>,
        fhe_public_key: Vec<u8>,
        server_key: Vec<u8>,
    ) -> Result<UserId> {
        self.access
            .authorize_or_admin(caller, Role::User, "register a user profile")
            .await?;

        if public_key.is_empty() {
            return Err(RegistryError::empty("public key"));
        }
        if fhe_public_key.is_empty() {
            return Err(RegistryError::empty("FHE public key"));
        }

        let mut table = self.table.write().await;
        let registered_at = Utc::now();
        let user_id = table.bind(*caller, |user_id| UserProfile {
            public_key,
            fhe_public_key,
            server_key,
            is_active: true,
            user_id,
            registered_at,
        })?;

        tracing::info!(principal = %caller, user_id, "user registered");
        self.events
            .emit(RegistryEvent::UserRegistered {
                principal: *caller,
                user_id,
                timestamp: registered_at,
            })
            .await;

        Ok(user_id)
    }

    /// Look up a user's profile
    pub async fn users(&self, principal: &Principal) -> Result<UserProfile> {
        self.table.read().await.get(principal)
    }

    pub async fn is_registered(&self, principal: &Principal) -> bool {
        self.table.read().await.contains(principal)
    }

    pub async fn user_count(&self) -> usize {
        self.table.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessControl;

    async fn setup() -> (UserRegistry, AccessControl, Principal) {
        let events = EventBus::default();
        let admin = Principal::random();
        let access = AccessControl::new(admin, events.clone());
        let registry = UserRegistry::new(Arc::new(access.clone()), events);
        (registry, access, admin)
    }

    #[tokio::test]
    async fn test_register_and_read_back() {
        let (registry, access, admin) = setup().await;
        let user = Principal::random();
        access.register_user(&admin, user).await.unwrap();

        let id = registry
            .register_user(&user, vec![1; 32], vec![2; 32], vec![3; 32])
            .await
            .unwrap();
        assert_eq!(id, 1);

        let profile = registry.users(&user).await.unwrap();
        assert_eq!(profile.public_key, vec![1; 32]);
        assert_eq!(profile.fhe_public_key, vec![2; 32]);
        assert_eq!(profile.server_key, vec![3; 32]);
        assert!(profile.is_active);
    }

    #[tokio::test]
    async fn test_requires_user_role() {
        let (registry, _, _) = setup().await;
        let stranger = Principal::random();

        let result = registry
            .register_user(&stranger, vec![1], vec![2], vec![3])
            .await;

        assert!(matches!(result, Err(RegistryError::Unauthorized { .. })));
        assert!(!registry.is_registered(&stranger).await);
    }

    #[tokio::test]
    async fn test_administrator_may_register_itself() {
        let (registry, _, admin) = setup().await;

        let id = registry
            .register_user(&admin, vec![1], vec![2], vec![3])
            .await
            .unwrap();
        assert_eq!(id, 1);
    }

    #[tokio::test]
    async fn test_reregistration_rejected_and_id_kept() {
        let (registry, _, admin) = setup().await;
        registry
            .register_user(&admin, vec![1], vec![2], vec![3])
            .await
            .unwrap();

        let result = registry
            .register_user(&admin, vec![9], vec![9], vec![9])
            .await;

        assert!(matches!(result, Err(RegistryError::AlreadyRegistered { .. })));
        let profile = registry.users(&admin).await.unwrap();
        assert_eq!(profile.user_id, 1);
        assert_eq!(profile.public_key, vec![1]);
    }

    #[tokio::test]
    async fn test_empty_keys_rejected() {
        let (registry, _, admin) = setup().await;

        let result = registry.register_user(&admin, vec![], vec![2], vec![]).await;
        assert!(matches!(result, Err(RegistryError::InvalidArgument { .. })));

        let result = registry.register_user(&admin, vec![1], vec![], vec![]).await;
        assert!(matches!(result, Err(RegistryError::InvalidArgument { .. })));

        assert_eq!(registry.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_user_not_found() {
        let (registry, _, _) = setup().await;
        assert!(matches!(
            registry.users(&Principal::random()).await,
            Err(RegistryError::NotFound { .. })
        ));
    }
}
