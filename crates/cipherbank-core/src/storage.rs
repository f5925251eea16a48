//! Data storage - access-gated key/value store for opaque encrypted payloads
//!
//! Gating policy:
//! - any principal holding a role may create a new key and becomes its owner
//! - only the owner or an administrator may overwrite an existing key
//! - reads, including the owner lookup, require holding a role; payloads are
//!   ciphertext, so role holders may read any key

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cipherbank_types::{Principal, RegistryError, RegistryEvent, Result, Role};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::access::RoleAuthority;
use crate::events::EventBus;

/// A stored payload and its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    #[serde(with = "hex::serde")]
    pub payload: Vec<u8>,
    /// Principal that first wrote the key
    pub owner: Principal,
    /// Principal that wrote the current payload
    pub writer: Principal,
    /// Number of writes, starting at 1
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

/// The data store
#[derive(Clone)]
pub struct DataStorage {
    access: Arc<dyn RoleAuthority>,
    events: EventBus,
    records: Arc<RwLock<HashMap<String, StoredRecord>>>,
}

impl DataStorage {
    pub fn new(access: Arc<dyn RoleAuthority>, events: EventBus) -> Self {
        Self {
            access,
            events,
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Write or overwrite a payload
    pub async fn store(&self, caller: &Principal, key: &str, payload: Vec<u8>) -> Result<u64> {
        if key.is_empty() {
            return Err(RegistryError::empty("storage key"));
        }
        if payload.is_empty() {
            return Err(RegistryError::empty("payload"));
        }
        if !self.access.has_any_role(caller).await {
            tracing::warn!(%caller, key, "store by principal without a role");
            return Err(RegistryError::unauthorized(*caller, format!("store {key}")));
        }

        let is_admin = self.access.has_role(caller, Role::Administrator).await;
        let mut records = self.records.write().await;
        let now = Utc::now();
        let size = payload.len();

        let version = match records.get_mut(key) {
            Some(record) => {
                if record.owner != *caller && !is_admin {
                    tracing::warn!(%caller, key, owner = %record.owner, "overwrite by non-owner");
                    return Err(RegistryError::unauthorized(*caller, format!("overwrite {key}")));
                }
                record.payload = payload;
                record.writer = *caller;
                record.version += 1;
                record.updated_at = now;
                record.version
            }
            None => {
                records.insert(
                    key.to_string(),
                    StoredRecord {
                        payload,
                        owner: *caller,
                        writer: *caller,
                        version: 1,
                        updated_at: now,
                    },
                );
                1
            }
        };

        tracing::info!(%caller, key, size, version, "payload stored");
        self.events
            .emit(RegistryEvent::StorageUpdated {
                key: key.to_string(),
                writer: *caller,
                size,
                timestamp: now,
            })
            .await;

        Ok(version)
    }

    /// Read a payload
    pub async fn retrieve(&self, caller: &Principal, key: &str) -> Result<Vec<u8>> {
        Ok(self.record(caller, key).await?.payload)
    }

    /// Owner of a key. Gated like reads.
    pub async fn owner(&self, caller: &Principal, key: &str) -> Result<Principal> {
        Ok(self.record(caller, key).await?.owner)
    }

    /// Read a payload with its provenance
    pub async fn record(&self, caller: &Principal, key: &str) -> Result<StoredRecord> {
        if !self.access.has_any_role(caller).await {
            return Err(RegistryError::unauthorized(*caller, format!("read {key}")));
        }
        self.records
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(format!("record {key}")))
    }
}
