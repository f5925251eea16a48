//! Role model
//!
//! A principal may hold any subset of {administrator, bank, user}.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named capability granted by access control
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May grant roles and overwrite any stored record
    Administrator,
    /// May register a bank profile and fulfil tasks addressed to it
    Bank,
    /// May register a user profile and create tasks
    User,
}

impl Role {
    /// All roles, in declaration order
    pub const ALL: [Role; 3] = [Role::Administrator, Role::Bank, Role::User];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Administrator => write!(f, "administrator"),
            Self::Bank => write!(f, "bank"),
            Self::User => write!(f, "user"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display_matches_serde() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role));
        }
    }
}
