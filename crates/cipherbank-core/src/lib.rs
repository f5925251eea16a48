//! Cipherbank Core - permissioned registries and the verifiable task workflow
//!
//! Components, leaf-first:
//! - [`AccessControl`]: the role model every other component consults
//! - [`UserRegistry`]: binds a user principal to its key material
//! - [`BankRegistry`]: binds a bank principal to its public key
//! - [`DataStorage`]: access-gated store for opaque encrypted payloads
//! - [`TaskManagement`]: create → complete → publish between a user and a bank
//!
//! Each mutating call authorizes the caller, commits under one write lock
//! (id counters included) and emits exactly one event on success.
//!
//! ```text
//! caller ──▶ component ──authorize──▶ AccessControl
//!                │
//!                ├── commit state
//!                └── emit ──▶ EventBus ──▶ subscribers / history
//! ```

pub mod access;
pub mod bank_registry;
pub mod deployment;
pub mod events;
mod registry;
pub mod storage;
pub mod task;
pub mod user_registry;

pub use access::{AccessControl, RoleAuthority};
pub use bank_registry::{BankProfile, BankRegistry};
pub use deployment::{Deployment, DeploymentError, DeploymentRecord};
pub use events::{EventBus, EventBusConfig};
pub use storage::{DataStorage, StoredRecord};
pub use task::{Task, TaskManagement, TaskState};
pub use user_registry::{UserProfile, UserRegistry};

pub use cipherbank_types::*;
