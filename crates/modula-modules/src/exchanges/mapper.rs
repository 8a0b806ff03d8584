use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::trace;

use modula_error::{ModuleError, ModuleResult, SchemaResult};
use modula_schema::{derive_id, Dec, Fact, Id, Immutables, Mutables, Properties, Property};
use modula_store::{Context, Mappable, Mapper};

use crate::constants::properties::{OWNABLE_ID, OWNER_ID};

/// Owner of the splits held against open orders
pub const ESCROW: &str = "exchanges.escrow";

pub fn escrow_id() -> Id {
    Id::new(ESCROW)
}

/// Balance of one ownable held by one identity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Split {
    pub id: Id,
    pub owner_id: Id,
    pub ownable_id: Id,
    pub value: Dec,
}

impl Mappable for Split {
    fn id(&self) -> Id {
        self.id.clone()
    }
}

pub fn split_id(chain_id: &Id, owner_id: &Id, ownable_id: &Id) -> SchemaResult<Id> {
    let immutables = Immutables::new(Properties::from_list([
        Property::new(OWNER_ID, Fact::Id(owner_id.clone())),
        Property::new(OWNABLE_ID, Fact::Id(ownable_id.clone())),
    ]));
    derive_id(chain_id, &immutables, &Mutables::default())
}

pub const SPLITS: Mapper<Split> = Mapper::new("splits");

/// Take `value` of an ownable from its owner. A split reaching zero is removed.
pub fn debit(
    ctx: &mut Context<'_>,
    mapper: &Mapper<Split>,
    owner_id: &Id,
    ownable_id: &Id,
    value: &Dec,
) -> ModuleResult<()> {
    let id = split_id(ctx.chain_id(), owner_id, ownable_id)?;
    let mut splits = mapper.fetch(ctx, &id)?;
    let mut split = splits
        .get(&id)
        .cloned()
        .ok_or_else(|| ModuleError::entity_not_found(format!("{} holds no {}", owner_id, ownable_id)))?;

    if split.value < *value {
        return Err(ModuleError::insufficient_balance(format!(
            "{} holds {} of {}, needs {}",
            owner_id, split.value, ownable_id, value
        )));
    }

    split.value = split.value.sub(value);
    trace!(split_id = %id, remaining = %split.value, "Debited split");
    if split.value.is_zero() {
        splits.remove(ctx, &split)?;
    } else {
        splits.mutate(ctx, split)?;
    }
    Ok(())
}

/// Give `value` of an ownable to an owner, creating the split when absent
pub fn credit(
    ctx: &mut Context<'_>,
    mapper: &Mapper<Split>,
    owner_id: &Id,
    ownable_id: &Id,
    value: &Dec,
) -> ModuleResult<()> {
    let id = split_id(ctx.chain_id(), owner_id, ownable_id)?;
    let mut splits = mapper.fetch(ctx, &id)?;
    match splits.get(&id).cloned() {
        Some(mut split) => {
            split.value = split.value.add(value);
            trace!(split_id = %id, total = %split.value, "Credited split");
            splits.mutate(ctx, split)?;
        }
        None => {
            trace!(split_id = %id, total = %value, "Opened split");
            splits.add(
                ctx,
                Split {
                    id,
                    owner_id: owner_id.clone(),
                    ownable_id: ownable_id.clone(),
                    value: value.clone(),
                },
            )?;
        }
    }
    Ok(())
}

/// Debit then credit; nothing is written unless both succeed
pub fn move_split(
    ctx: &mut Context<'_>,
    mapper: &Mapper<Split>,
    from_id: &Id,
    to_id: &Id,
    ownable_id: &Id,
    value: &Dec,
) -> ModuleResult<()> {
    debit(ctx, mapper, from_id, ownable_id, value)?;
    credit(ctx, mapper, to_id, ownable_id, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modula_store::{Header, MemoryStore};

    fn balance(ctx: &Context<'_>, owner: &str, ownable: &str) -> Option<Dec> {
        let id = split_id(ctx.chain_id(), &Id::new(owner), &Id::new(ownable)).unwrap();
        SPLITS.fetch(ctx, &id).unwrap().get(&id).map(|split| split.value.clone())
    }

    #[test]
    fn test_credit_and_debit() {
        let store = MemoryStore::new();
        let mut ctx = Context::new(Header::new("test-1", 1), &store);
        let (alice, bob, coin) = (Id::new("alice"), Id::new("bob"), Id::new("coin"));

        credit(&mut ctx, &SPLITS, &alice, &coin, &Dec::from_integer(10)).unwrap();
        credit(&mut ctx, &SPLITS, &alice, &coin, &Dec::from_integer(5)).unwrap();
        assert_eq!(balance(&ctx, "alice", "coin"), Some(Dec::from_integer(15)));

        move_split(&mut ctx, &SPLITS, &alice, &bob, &coin, &Dec::from_integer(15)).unwrap();
        assert_eq!(balance(&ctx, "alice", "coin"), None);
        assert_eq!(balance(&ctx, "bob", "coin"), Some(Dec::from_integer(15)));
    }

    #[test]
    fn test_debit_errors() {
        let store = MemoryStore::new();
        let mut ctx = Context::new(Header::new("test-1", 1), &store);
        let (alice, coin) = (Id::new("alice"), Id::new("coin"));

        assert!(matches!(
            debit(&mut ctx, &SPLITS, &alice, &coin, &Dec::from_integer(1)),
            Err(ModuleError::EntityNotFound(_))
        ));

        credit(&mut ctx, &SPLITS, &alice, &coin, &Dec::from_integer(1)).unwrap();
        assert!(matches!(
            debit(&mut ctx, &SPLITS, &alice, &coin, &Dec::parse("1.5").unwrap()),
            Err(ModuleError::InsufficientBalance(_))
        ));
        assert_eq!(balance(&ctx, "alice", "coin"), Some(Dec::from_integer(1)));
    }
}
