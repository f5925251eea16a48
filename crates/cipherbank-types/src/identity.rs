//! Identity types for Cipherbank
//!
//! A `Principal` is the address-like identifier of any actor (administrator,
//! bank or user). Authentication happens outside this system; components only
//! ever receive an already-authenticated principal per call.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::RegistryError;

/// Length in bytes of a principal address
pub const PRINCIPAL_LEN: usize = 20;

/// An authenticated actor identifier, rendered as `0x`-prefixed hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(pub [u8; PRINCIPAL_LEN]);

impl Principal {
    /// Create from raw address bytes
    pub fn from_bytes(bytes: [u8; PRINCIPAL_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate a random principal
    pub fn random() -> Self {
        let mut bytes = [0u8; PRINCIPAL_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Parse from hex (with or without `0x` prefix)
    pub fn parse(s: &str) -> Result<Self, RegistryError> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(raw).map_err(|e| RegistryError::InvalidArgument {
            message: format!("principal {s:?} is not valid hex: {e}"),
        })?;
        let bytes: [u8; PRINCIPAL_LEN] =
            decoded
                .try_into()
                .map_err(|v: Vec<u8>| RegistryError::InvalidArgument {
                    message: format!(
                        "principal must be {PRINCIPAL_LEN} bytes, got {}",
                        v.len()
                    ),
                })?;
        Ok(Self(bytes))
    }

    /// Get the raw address bytes
    pub fn as_bytes(&self) -> &[u8; PRINCIPAL_LEN] {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Principal {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = RegistryError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.to_string()
    }
}

/// Macro to generate ID types with common implementations
macro_rules! define_id_type {
    ($name:ident, $prefix:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse from a string (with or without prefix)
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                let s = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }
    };
}

define_id_type!(ComponentId, "component", "Identifier assigned to a provisioned component");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_display_is_prefixed_hex() {
        let p = Principal::from_bytes([0xab; PRINCIPAL_LEN]);
        let s = p.to_string();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 2 + PRINCIPAL_LEN * 2);
    }

    #[test]
    fn test_principal_parsing() {
        let p = Principal::random();
        assert_eq!(Principal::parse(&p.to_string()).unwrap(), p);

        let bare = hex::encode(p.as_bytes());
        assert_eq!(bare.parse::<Principal>().unwrap(), p);
    }

    #[test]
    fn test_principal_rejects_bad_input() {
        assert!(matches!(
            Principal::parse("0x1234"),
            Err(RegistryError::InvalidArgument { .. })
        ));
        assert!(Principal::parse("not-hex").is_err());
    }

    #[test]
    fn test_principal_serializes_as_string() {
        let p = Principal::from_bytes([1; PRINCIPAL_LEN]);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, format!("\"{}\"", p));
        let back: Principal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_component_id_prefix() {
        let id = ComponentId::new();
        let s = id.to_string();
        assert!(s.starts_with("component_"));
        assert_eq!(ComponentId::parse(&s).unwrap(), id);
    }
}
