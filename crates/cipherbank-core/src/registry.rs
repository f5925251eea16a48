//! Write-once-per-principal profile table shared by the user and bank registries

use std::collections::HashMap;

use cipherbank_types::{Principal, RegistryError, Result};

/// Profiles keyed by principal plus the id counter that numbers them.
///
/// The counter lives beside the map so an id is assigned under the same
/// lock as the insert that consumes it.
#[derive(Debug)]
pub(crate) struct ProfileTable<P> {
    profiles: HashMap<Principal, P>,
    next_id: u64,
    kind: &'static str,
}

impl<P: Clone> ProfileTable<P> {
    pub(crate) fn new(kind: &'static str) -> Self {
        Self {
            profiles: HashMap::new(),
            next_id: 1,
            kind,
        }
    }

    /// Bind a new profile, assigning the next id. Re-registration is rejected.
    pub(crate) fn bind(
        &mut self,
        principal: Principal,
        make: impl FnOnce(u64) -> P,
    ) -> Result<u64> {
        if self.profiles.contains_key(&principal) {
            return Err(RegistryError::AlreadyRegistered {
                principal,
                what: self.kind.to_string(),
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        self.profiles.insert(principal, make(id));
        Ok(id)
    }

    pub(crate) fn get(&self, principal: &Principal) -> Result<P> {
        self.profiles
            .get(principal)
            .cloned()
            .ok_or_else(|| {
                RegistryError::not_found(format!("{} profile for {}", self.kind, principal))
            })
    }

    pub(crate) fn contains(&self, principal: &Principal) -> bool {
        self.profiles.contains_key(principal)
    }

    pub(crate) fn len(&self) -> usize {
        self.profiles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential_from_one() {
        let mut table = ProfileTable::new("user");
        let a = table.bind(Principal::random(), |id| id).unwrap();
        let b = table.bind(Principal::random(), |id| id).unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_rebind_keeps_original_id() {
        let mut table = ProfileTable::new("bank");
        let p = Principal::random();
        table.bind(p, |id| id).unwrap();

        let err = table.bind(p, |id| id * 100).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered { .. }));
        assert_eq!(table.get(&p).unwrap(), 1);
    }

    #[test]
    fn test_missing_profile() {
        let table: ProfileTable<u64> = ProfileTable::new("user");
        assert!(matches!(
            table.get(&Principal::random()),
            Err(RegistryError::NotFound { .. })
        ));
    }
}
