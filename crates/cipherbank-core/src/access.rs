//! Access control - the role model every other component consults
//!
//! The initializing principal becomes the sole administrator. Administrators
//! grant the bank, user and administrator roles. Roles are never revoked.
//!
//! Three checks are exposed through [`RoleAuthority`]:
//! - `has_role` is exact membership, used when a principal is named as a
//!   counterparty (e.g. the bank a task is addressed to)
//! - `authorize` is the same membership test as a caller check, failing with
//!   `Unauthorized`; `authorize_or_admin` also admits administrators and is
//!   only used where an administrator may act as a user

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use cipherbank_types::{Principal, RegistryError, RegistryEvent, Result, Role};
use tokio::sync::RwLock;

use crate::events::EventBus;

/// Shared capability check held by every component
#[async_trait]
pub trait RoleAuthority: Send + Sync {
    /// Exact role membership. Never fails.
    async fn has_role(&self, principal: &Principal, role: Role) -> bool;

    /// Authorize a caller for an action requiring `role`
    async fn authorize(&self, principal: &Principal, role: Role, action: &str) -> Result<()> {
        if self.has_role(principal, role).await {
            Ok(())
        } else {
            tracing::warn!(%principal, %role, action, "authorization denied");
            Err(RegistryError::unauthorized(*principal, action))
        }
    }

    /// Like [`authorize`](Self::authorize), but an administrator also passes
    async fn authorize_or_admin(
        &self,
        principal: &Principal,
        role: Role,
        action: &str,
    ) -> Result<()> {
        if self.has_role(principal, Role::Administrator).await {
            return Ok(());
        }
        self.authorize(principal, role, action).await
    }

    /// Whether the principal holds at least one role
    async fn has_any_role(&self, principal: &Principal) -> bool {
        for role in Role::ALL {
            if self.has_role(principal, role).await {
                return true;
            }
        }
        false
    }
}

#[derive(Debug, Default)]
struct RoleSets {
    administrators: HashSet<Principal>,
    banks: HashSet<Principal>,
    users: HashSet<Principal>,
}

impl RoleSets {
    fn members(&self, role: Role) -> &HashSet<Principal> {
        match role {
            Role::Administrator => &self.administrators,
            Role::Bank => &self.banks,
            Role::User => &self.users,
        }
    }

    fn members_mut(&mut self, role: Role) -> &mut HashSet<Principal> {
        match role {
            Role::Administrator => &mut self.administrators,
            Role::Bank => &mut self.banks,
            Role::User => &mut self.users,
        }
    }
}

/// The role registry
#[derive(Clone)]
pub struct AccessControl {
    roles: Arc<RwLock<RoleSets>>,
    events: EventBus,
}

impl AccessControl {
    /// Initialize with `initializer` as the sole administrator
    pub fn new(initializer: Principal, events: EventBus) -> Self {
        let mut roles = RoleSets::default();
        roles.administrators.insert(initializer);
        tracing::info!(administrator = %initializer, "access control initialized");

        Self {
            roles: Arc::new(RwLock::new(roles)),
            events,
        }
    }

    /// Grant the administrator role
    pub async fn add_admin(&self, caller: &Principal, principal: Principal) -> Result<()> {
        self.grant(caller, principal, Role::Administrator).await
    }

    /// Grant the bank role
    pub async fn add_bank(&self, caller: &Principal, principal: Principal) -> Result<()> {
        self.grant(caller, principal, Role::Bank).await
    }

    /// Grant the user role
    pub async fn register_user(&self, caller: &Principal, principal: Principal) -> Result<()> {
        self.grant(caller, principal, Role::User).await
    }

    pub async fn is_admin(&self, principal: &Principal) -> bool {
        self.has_role(principal, Role::Administrator).await
    }

    pub async fn is_bank(&self, principal: &Principal) -> bool {
        self.has_role(principal, Role::Bank).await
    }

    pub async fn is_user(&self, principal: &Principal) -> bool {
        self.has_role(principal, Role::User).await
    }

    /// All roles held by a principal
    pub async fn roles(&self, principal: &Principal) -> BTreeSet<Role> {
        let roles = self.roles.read().await;
        Role::ALL
            .into_iter()
            .filter(|role| roles.members(*role).contains(principal))
            .collect()
    }

    /// Number of principals holding a role
    pub async fn member_count(&self, role: Role) -> usize {
        self.roles.read().await.members(role).len()
    }

    async fn grant(&self, caller: &Principal, principal: Principal, role: Role) -> Result<()> {
        let mut roles = self.roles.write().await;

        if !roles.administrators.contains(caller) {
            tracing::warn!(%caller, %principal, %role, "role grant by non-administrator");
            return Err(RegistryError::unauthorized(*caller, format!("grant {role} role")));
        }

        if !roles.members_mut(role).insert(principal) {
            return Err(RegistryError::role_already_held(principal, role));
        }

        tracing::info!(%principal, %role, granted_by = %caller, "role granted");
        self.events
            .emit(RegistryEvent::RoleGranted {
                principal,
                role,
                granted_by: *caller,
                timestamp: Utc::now(),
            })
            .await;

        Ok(())
    }
}

#[async_trait]
impl RoleAuthority for AccessControl {
    async fn has_role(&self, principal: &Principal, role: Role) -> bool {
        self.roles.read().await.members(role).contains(principal)
    }
}
