//! Cipherbank Types - Canonical domain types for the permissioned task registry
//!
//! This crate contains the foundational types shared by every Cipherbank
//! component, with zero dependencies on other cipherbank crates:
//!
//! - Identity types (Principal, ComponentId)
//! - The role model (Role)
//! - Registry errors (RegistryError)
//! - Notification records (RegistryEvent)
//!
//! # Architectural Invariants
//!
//! 1. Every privileged action is authorized against the role model first
//! 2. Registries are append-only: profiles and tasks are never deleted
//! 3. Key, result and signature material is opaque and never interpreted
//! 4. Failure must be explicit and leaves no partial state behind

pub mod identity;
pub mod role;
pub mod error;
pub mod event;

pub use identity::*;
pub use role::*;
pub use error::*;
pub use event::*;

/// Sequential identifier assigned to a user at first registration
pub type UserId = u64;

/// Sequential identifier assigned to a bank at first registration
pub type BankId = u64;

/// Sequential identifier assigned to a task at creation
pub type TaskId = u64;

/// Version of the Cipherbank types schema
pub const TYPES_VERSION: &str = "0.1.0";
