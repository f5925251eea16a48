//! Notification records
//!
//! Every successful state-mutating call emits exactly one event. External
//! observers replay these to reconstruct state transitions without polling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Principal;
use crate::role::Role;
use crate::{BankId, TaskId, UserId};

/// Events emitted by Cipherbank components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RegistryEvent {
    /// A role was granted by an administrator
    RoleGranted {
        principal: Principal,
        role: Role,
        granted_by: Principal,
        timestamp: DateTime<Utc>,
    },

    /// A user profile was bound to its principal
    UserRegistered {
        principal: Principal,
        user_id: UserId,
        timestamp: DateTime<Utc>,
    },

    /// A bank profile was bound to its principal
    BankRegistered {
        principal: Principal,
        bank_id: BankId,
        timestamp: DateTime<Utc>,
    },

    /// A user addressed a new task to a bank
    TaskCreated {
        task_id: TaskId,
        bank: Principal,
        user: Principal,
        description: String,
        timestamp: DateTime<Utc>,
    },

    /// The designated bank supplied a result
    TaskCompleted {
        task_id: TaskId,
        #[serde(with = "hex::serde")]
        result: Vec<u8>,
        timestamp: DateTime<Utc>,
    },

    /// The owning user published a signature over the result
    TaskPublished {
        task_id: TaskId,
        #[serde(with = "hex::serde")]
        signature: Vec<u8>,
        timestamp: DateTime<Utc>,
    },

    /// An encrypted payload was written to data storage
    StorageUpdated {
        key: String,
        writer: Principal,
        size: usize,
        timestamp: DateTime<Utc>,
    },
}

impl RegistryEvent {
    /// Get the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::RoleGranted { timestamp, .. }
            | Self::UserRegistered { timestamp, .. }
            | Self::BankRegistered { timestamp, .. }
            | Self::TaskCreated { timestamp, .. }
            | Self::TaskCompleted { timestamp, .. }
            | Self::TaskPublished { timestamp, .. }
            | Self::StorageUpdated { timestamp, .. } => *timestamp,
        }
    }

    /// Operation name carried by the event
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoleGranted { .. } => "RoleGranted",
            Self::UserRegistered { .. } => "UserRegistered",
            Self::BankRegistered { .. } => "BankRegistered",
            Self::TaskCreated { .. } => "TaskCreated",
            Self::TaskCompleted { .. } => "TaskCompleted",
            Self::TaskPublished { .. } => "TaskPublished",
            Self::StorageUpdated { .. } => "StorageUpdated",
        }
    }

    /// Get a short description for logging
    pub fn summary(&self) -> String {
        match self {
            Self::RoleGranted {
                principal, role, ..
            } => format!("Role granted: {} → {}", principal, role),
            Self::UserRegistered {
                principal, user_id, ..
            } => format!("User #{} registered: {}", user_id, principal),
            Self::BankRegistered {
                principal, bank_id, ..
            } => format!("Bank #{} registered: {}", bank_id, principal),
            Self::TaskCreated {
                task_id,
                bank,
                description,
                ..
            } => format!("Task {} created for {}: {}", task_id, bank, description),
            Self::TaskCompleted {
                task_id, result, ..
            } => format!("Task {} completed ({} byte result)", task_id, result.len()),
            Self::TaskPublished {
                task_id, signature, ..
            } => format!(
                "Task {} published ({} byte signature)",
                task_id,
                signature.len()
            ),
            Self::StorageUpdated { key, size, .. } => {
                format!("Storage {}: {} bytes", key, size)
            }
        }
    }
}
