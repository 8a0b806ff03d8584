// Generic module genesis state
//
// A module's genesis state is the list of its entities. Import replays
// `create` for each entity in list order; export walks the mapper from the
// zero ID, so an export is always in key order.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use modula_error::{ModuleError, ModuleResult, StoreError};
use modula_schema::Id;
use modula_store::{Context, Mappable, Mapper};

/// Snapshot of every entity a module stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenesisState<E> {
    pub entities: Vec<E>,
}

impl<E> Default for GenesisState<E> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
        }
    }
}

impl<E> GenesisState<E>
where
    E: Mappable + Serialize + DeserializeOwned,
{
    pub fn new(entities: Vec<E>) -> Self {
        Self { entities }
    }

    /// Every entity ID must be unique
    pub fn validate(&self) -> ModuleResult<()> {
        let mut seen = BTreeSet::new();
        for entity in &self.entities {
            let id = entity.id();
            if !seen.insert(id.clone()) {
                return Err(ModuleError::entity_already_exists(id.to_string()));
            }
        }
        Ok(())
    }

    /// Load the snapshot into `mapper`
    pub fn initialize(&self, ctx: &mut Context<'_>, mapper: &Mapper<E>) -> ModuleResult<()> {
        self.validate()?;
        for entity in &self.entities {
            mapper.create(ctx, entity).map_err(|error| match error {
                StoreError::KeyConflict(id) => ModuleError::EntityAlreadyExists(id),
                other => ModuleError::Store(other),
            })?;
        }
        info!(prefix = mapper.prefix(), count = self.entities.len(), "Initialized genesis");
        Ok(())
    }

    /// Collect every stored entity in key order
    pub fn export(ctx: &Context<'_>, mapper: &Mapper<E>) -> ModuleResult<Self> {
        let mut entities = Vec::new();
        mapper.iterate(ctx, &Id::zero(), |entity| {
            entities.push(entity.clone());
            false
        })?;
        Ok(Self { entities })
    }

    pub fn from_value(value: &serde_json::Value) -> ModuleResult<Self> {
        Self::deserialize(value)
            .map_err(|e| ModuleError::incorrect_format(format!("genesis state: {}", e)))
    }

    pub fn to_value(&self) -> ModuleResult<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|e| ModuleError::incorrect_format(format!("genesis state: {}", e)))
    }

    pub fn ids(&self) -> BTreeSet<Id> {
        self.entities.iter().map(Mappable::id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use borsh::{BorshDeserialize, BorshSerialize};
    use modula_store::{Header, MemoryStore};
    use pretty_assertions::assert_eq;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
    struct Record {
        id: Id,
        weight: u32,
    }

    impl Mappable for Record {
        fn id(&self) -> Id {
            self.id.clone()
        }
    }

    const RECORDS: Mapper<Record> = Mapper::new("records");

    fn record(id: &str, weight: u32) -> Record {
        Record {
            id: Id::new(id),
            weight,
        }
    }

    #[test]
    fn test_export_then_initialize_reproduces_ids() -> anyhow::Result<()> {
        let mut source = MemoryStore::new();
        let mut ctx = Context::new(Header::new("test-1", 1), &source);
        GenesisState::new(vec![record("b", 2), record("a", 1), record("c", 3)])
            .initialize(&mut ctx, &RECORDS)?;
        let change_set = ctx.into_change_set();
        source.apply(change_set);

        let exported = GenesisState::export(&Context::new(Header::new("test-1", 1), &source), &RECORDS)?;
        let json = exported.to_value()?;

        let mut target = MemoryStore::new();
        let mut ctx = Context::new(Header::new("test-1", 1), &target);
        GenesisState::<Record>::from_value(&json)?.initialize(&mut ctx, &RECORDS)?;
        let change_set = ctx.into_change_set();
        target.apply(change_set);

        let reimported = GenesisState::export(&Context::new(Header::new("test-1", 1), &target), &RECORDS)?;
        assert_eq!(reimported.ids(), exported.ids());
        assert_eq!(reimported, exported);
        assert_eq!(target.state_hash(), source.state_hash());
        Ok(())
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let state = GenesisState::new(vec![record("a", 1), record("a", 2)]);
        assert_eq!(state.validate(), Err(ModuleError::entity_already_exists("a")));
    }

    #[test]
    fn test_initialize_over_existing_entity_fails() {
        let store = MemoryStore::new();
        let mut ctx = Context::new(Header::new("test-1", 1), &store);
        GenesisState::new(vec![record("a", 1)]).initialize(&mut ctx, &RECORDS).unwrap();
        let again = GenesisState::new(vec![record("a", 1)]).initialize(&mut ctx, &RECORDS);
        assert_eq!(again, Err(ModuleError::entity_already_exists("a")));
    }
}
