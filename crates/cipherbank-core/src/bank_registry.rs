//! Bank registry - binds a bank principal to its public key

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cipherbank_types::{BankId, Principal, RegistryError, RegistryEvent, Result, Role};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::access::RoleAuthority;
use crate::events::EventBus;
use crate::registry::ProfileTable;

/// A registered bank's identity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankProfile {
    #[serde(with = "hex::serde")]
    pub public_key: Vec<u8>,
    pub is_active: bool,
    pub bank_id: BankId,
    pub registered_at: DateTime<Utc>,
}

/// The bank registry
#[derive(Clone)]
pub struct BankRegistry {
    access: Arc<dyn RoleAuthority>,
    events: EventBus,
    table: Arc<RwLock<ProfileTable<BankProfile>>>,
}

impl BankRegistry {
    pub fn new(access: Arc<dyn RoleAuthority>, events: EventBus) -> Self {
        Self {
            access,
            events,
            table: Arc::new(RwLock::new(ProfileTable::new("bank"))),
        }
    }

    /// Register the caller's public key. The bank role must be granted first.
    pub async fn register_bank(&self, caller: &Principal, public_key: Vec<u8>) -> Result<BankId> {
        self.access
            .authorize(caller, Role::Bank, "register a bank profile")
            .await?;

        if public_key.is_empty() {
            return Err(RegistryError::empty("public key"));
        }

        let mut table = self.table.write().await;
        let registered_at = Utc::now();
        let bank_id = table.bind(*caller, |bank_id| BankProfile {
            public_key,
            is_active: true,
            bank_id,
            registered_at,
        })?;

        tracing::info!(principal = %caller, bank_id, "bank registered");
        self.events
            .emit(RegistryEvent::BankRegistered {
                principal: *caller,
                bank_id,
                timestamp: registered_at,
            })
            .await;

        Ok(bank_id)
    }

    /// Look up a bank's profile
    pub async fn banks(&self, principal: &Principal) -> Result<BankProfile> {
        self.table.read().await.get(principal)
    }

    pub async fn is_registered(&self, principal: &Principal) -> bool {
        self.table.read().await.contains(principal)
    }

    pub async fn bank_count(&self) -> usize {
        self.table.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessControl;

    fn setup() -> (BankRegistry, AccessControl, Principal, EventBus) {
        let events = EventBus::default();
        let admin = Principal::random();
        let access = AccessControl::new(admin, events.clone());
        let registry = BankRegistry::new(Arc::new(access.clone()), events.clone());
        (registry, access, admin, events)
    }

    #[tokio::test]
    async fn test_register_bank_after_grant() {
        let (registry, access, admin, events) = setup();
        let bank = Principal::random();
        access.add_bank(&admin, bank).await.unwrap();

        let id = registry.register_bank(&bank, vec![7; 32]).await.unwrap();

        assert_eq!(id, 1);
        let profile = registry.banks(&bank).await.unwrap();
        assert!(profile.is_active);
        assert_eq!(profile.public_key, vec![7; 32]);
        assert!(matches!(
            events.last().await,
            Some(RegistryEvent::BankRegistered { bank_id: 1, principal, .. }) if principal == bank
        ));
    }

    #[tokio::test]
    async fn test_ungranted_bank_rejected() {
        let (registry, _, _, events) = setup();
        let bank = Principal::random();

        let result = registry.register_bank(&bank, vec![7; 32]).await;

        assert!(matches!(result, Err(RegistryError::Unauthorized { .. })));
        assert!(matches!(
            registry.banks(&bank).await,
            Err(RegistryError::NotFound { .. })
        ));
        assert!(events.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_administrator_needs_bank_grant() {
        let (registry, access, admin, events) = setup();

        let result = registry.register_bank(&admin, vec![1; 32]).await;

        assert!(matches!(result, Err(RegistryError::Unauthorized { .. })));
        assert!(!registry.is_registered(&admin).await);
        assert!(events.history().await.is_empty());

        access.add_bank(&admin, admin).await.unwrap();
        assert_eq!(registry.register_bank(&admin, vec![1; 32]).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_user_role_is_not_bank_role() {
        let (registry, access, admin, _) = setup();
        let user = Principal::random();
        access.register_user(&admin, user).await.unwrap();

        let result = registry.register_bank(&user, vec![1]).await;
        assert!(matches!(result, Err(RegistryError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_bank_ids_increase() {
        let (registry, access, admin, _) = setup();
        let first = Principal::random();
        let second = Principal::random();
        access.add_bank(&admin, first).await.unwrap();
        access.add_bank(&admin, second).await.unwrap();

        assert_eq!(registry.register_bank(&first, vec![1]).await.unwrap(), 1);
        assert_eq!(registry.register_bank(&second, vec![2]).await.unwrap(), 2);
        assert!(matches!(
            registry.register_bank(&first, vec![3]).await,
            Err(RegistryError::AlreadyRegistered { .. })
        ));
        assert_eq!(registry.bank_count().await, 2);
    }
}
