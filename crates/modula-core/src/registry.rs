// Auxiliary registry
//
// Built once from the ordered list of auxiliaries every module provides, then
// handed read-only to each module's initializer. Keepers resolve the
// capabilities they need by name at that point, so a missing capability stops
// the application from starting instead of failing a transaction later.

use std::collections::BTreeMap;

use tracing::{debug, info};

use modula_error::{RegistryError, RegistryResult};

use crate::auxiliary::Auxiliary;

/// Frozen name-to-capability mapping
#[derive(Debug, Default)]
pub struct AuxiliaryRegistry {
    auxiliaries: BTreeMap<&'static str, Auxiliary>,
}

impl AuxiliaryRegistry {
    /// Bind every provided auxiliary by name; names must be unique
    pub fn new(auxiliaries: Vec<Auxiliary>) -> RegistryResult<Self> {
        let mut bound = BTreeMap::new();
        for auxiliary in auxiliaries {
            let name = auxiliary.name();
            if bound.contains_key(name) {
                return Err(RegistryError::DuplicateAuxiliary(name.to_string()));
            }
            debug!(auxiliary = name, "Registered auxiliary");
            bound.insert(name, auxiliary);
        }
        info!(count = bound.len(), "Auxiliary registry built");
        Ok(Self { auxiliaries: bound })
    }

    /// Look up the auxiliary `name` on behalf of `keeper`
    pub fn resolve(&self, keeper: &str, name: &str) -> RegistryResult<Auxiliary> {
        self.auxiliaries
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::unbound(keeper, name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.auxiliaries.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.auxiliaries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.auxiliaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.auxiliaries.is_empty()
    }
}
