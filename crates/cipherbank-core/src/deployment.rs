//! Provisioning and the deployment record
//!
//! `Deployment::provision` wires the five components around one access
//! control instance and one event feed. The record maps component names to
//! identifiers so clients and tests can discover them later.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use cipherbank_types::{ComponentId, Principal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::AccessControl;
use crate::bank_registry::BankRegistry;
use crate::events::{EventBus, EventBusConfig};
use crate::storage::DataStorage;
use crate::task::TaskManagement;
use crate::user_registry::UserRegistry;

pub const ACCESS_CONTROL: &str = "accessControl";
pub const USER_REGISTRY: &str = "userRegistry";
pub const BANK_REGISTRY: &str = "bankRegistry";
pub const DATA_STORAGE: &str = "dataStorage";
pub const TASK_MANAGEMENT: &str = "taskManagement";

/// Default file name for a saved record
pub const DEFAULT_RECORD_PATH: &str = "deployments.json";

/// Errors reading or writing a deployment record
#[derive(Error, Debug)]
pub enum DeploymentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Flat component name → identifier mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentRecord(pub BTreeMap<String, String>);

impl DeploymentRecord {
    pub fn get(&self, component: &str) -> Option<&str> {
        self.0.get(component).map(String::as_str)
    }

    /// Write as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DeploymentError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeploymentError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[derive(Debug, Clone)]
struct ComponentIds {
    access_control: ComponentId,
    user_registry: ComponentId,
    bank_registry: ComponentId,
    data_storage: ComponentId,
    task_management: ComponentId,
}

/// A provisioned set of components
#[derive(Clone)]
pub struct Deployment {
    pub administrator: Principal,
    pub events: EventBus,
    pub access_control: AccessControl,
    pub user_registry: UserRegistry,
    pub bank_registry: BankRegistry,
    pub data_storage: DataStorage,
    pub task_management: TaskManagement,
    ids: ComponentIds,
}

impl Deployment {
    /// Provision all components with `administrator` as the initializer
    pub fn provision(administrator: Principal, config: &EventBusConfig) -> Self {
        let events = EventBus::new(config);
        let access_control = AccessControl::new(administrator, events.clone());
        let authority = Arc::new(access_control.clone());

        let deployment = Self {
            administrator,
            user_registry: UserRegistry::new(authority.clone(), events.clone()),
            bank_registry: BankRegistry::new(authority.clone(), events.clone()),
            data_storage: DataStorage::new(authority.clone(), events.clone()),
            task_management: TaskManagement::new(authority, events.clone()),
            access_control,
            events,
            ids: ComponentIds {
                access_control: ComponentId::new(),
                user_registry: ComponentId::new(),
                bank_registry: ComponentId::new(),
                data_storage: ComponentId::new(),
                task_management: ComponentId::new(),
            },
        };

        tracing::info!(
            %administrator,
            access_control = %deployment.ids.access_control,
            task_management = %deployment.ids.task_management,
            "deployment provisioned"
        );
        deployment
    }

    /// The component name → identifier mapping
    pub fn record(&self) -> DeploymentRecord {
        let ids = &self.ids;
        DeploymentRecord(
            [
                (ACCESS_CONTROL, &ids.access_control),
                (USER_REGISTRY, &ids.user_registry),
                (BANK_REGISTRY, &ids.bank_registry),
                (DATA_STORAGE, &ids.data_storage),
                (TASK_MANAGEMENT, &ids.task_management),
            ]
            .into_iter()
            .map(|(name, id)| (name.to_string(), id.to_string()))
            .collect(),
        )
    }
}
