//! Error types for Cipherbank
//!
//! All errors are explicit and surfaced synchronously to the caller. A
//! failing operation commits no state and emits no event.

use thiserror::Error;

use crate::identity::Principal;
use crate::role::Role;
use crate::TaskId;

/// Result type for Cipherbank operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Registry and workflow errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Role or ownership check failed
    #[error("{principal} is not authorized to {action}")]
    Unauthorized { principal: Principal, action: String },

    /// Duplicate registry write or role grant
    #[error("{principal} is already registered as {what}")]
    AlreadyRegistered { principal: Principal, what: String },

    /// Query on an unknown key
    #[error("{what} not found")]
    NotFound { what: String },

    /// Task lifecycle transition attempted out of order
    #[error("Task {task_id} is {actual}, expected {expected}")]
    InvalidState {
        task_id: TaskId,
        expected: String,
        actual: String,
    },

    /// Empty or malformed payload where a non-empty one is required
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl RegistryError {
    /// Shorthand for an unauthorized action
    pub fn unauthorized(principal: Principal, action: impl Into<String>) -> Self {
        Self::Unauthorized {
            principal,
            action: action.into(),
        }
    }

    /// Shorthand for a duplicate role grant
    pub fn role_already_held(principal: Principal, role: Role) -> Self {
        Self::AlreadyRegistered {
            principal,
            what: role.to_string(),
        }
    }

    /// Shorthand for a missing record
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Shorthand for an empty required field
    pub fn empty(field: &str) -> Self {
        Self::InvalidArgument {
            message: format!("{field} must not be empty"),
        }
    }

    /// Stable error kind name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::AlreadyRegistered { .. } => "already_registered",
            Self::NotFound { .. } => "not_found",
            Self::InvalidState { .. } => "invalid_state",
            Self::InvalidArgument { .. } => "invalid_argument",
        }
    }
}
