// Generic entity mapper
//
// Every module stores its entities through a `Mapper<E>` bound to a key
// prefix. Keys are `prefix/ID`, values are the Borsh encoding of the entity.
// A `WorkingSet` is the transaction's view of the entities it fetched; its
// writes go straight into the transaction context buffer.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::marker::PhantomData;

use borsh::{BorshDeserialize, BorshSerialize};
use tracing::debug;

use modula_error::{StoreError, StoreResult};
use modula_schema::Id;

use crate::context::Context;
use crate::kv::KVStore;

/// An entity that can be kept in a [`Mapper`]
pub trait Mappable: Clone + Debug + BorshSerialize + BorshDeserialize {
    /// Key of this entity within its module
    fn id(&self) -> Id;
}

/// Keyed store of one entity type
#[derive(Debug)]
pub struct Mapper<E> {
    prefix: &'static str,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Mapper<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Mapper<E> {}

impl<E: Mappable> Mapper<E> {
    pub const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            _entity: PhantomData,
        }
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    fn key_prefix(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.prefix.len() + 1);
        key.extend_from_slice(self.prefix.as_bytes());
        key.push(b'/');
        key
    }

    fn key(&self, id: &Id) -> Vec<u8> {
        let mut key = self.key_prefix();
        key.extend_from_slice(id.as_bytes());
        key
    }

    fn encode(entity: &E) -> StoreResult<Vec<u8>> {
        borsh::to_vec(entity).map_err(|e| StoreError::Encode(format!("{}: {}", entity.id(), e)))
    }

    fn decode(bytes: &[u8]) -> StoreResult<E> {
        borsh::from_slice(bytes).map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Load the entity with `id`, if any, into a fresh working set.
    ///
    /// An absent entity yields an empty working set, not an error.
    pub fn fetch(&self, ctx: &Context<'_>, id: &Id) -> StoreResult<WorkingSet<E>> {
        let mut entities = BTreeMap::new();
        if let Some(bytes) = ctx.get(&self.key(id)) {
            entities.insert(id.clone(), Self::decode(&bytes)?);
        }
        Ok(WorkingSet {
            mapper: *self,
            entities,
        })
    }

    /// Visit entities in key order starting at `start`; the visitor returns
    /// `true` to stop early.
    pub fn iterate<F>(&self, ctx: &Context<'_>, start: &Id, mut visitor: F) -> StoreResult<()>
    where
        F: FnMut(&E) -> bool,
    {
        for (_, bytes) in ctx.scan(&self.key_prefix(), &self.key(start)) {
            let entity = Self::decode(&bytes)?;
            if visitor(&entity) {
                break;
            }
        }
        Ok(())
    }

    /// Insert an entity outside of a working set; used when loading genesis
    pub fn create(&self, ctx: &mut Context<'_>, entity: &E) -> StoreResult<()> {
        let key = self.key(&entity.id());
        if ctx.contains(&key) {
            return Err(StoreError::KeyConflict(entity.id().to_string()));
        }
        ctx.set(key, Self::encode(entity)?);
        Ok(())
    }
}

/// The transaction's view of the entities it fetched
#[derive(Debug)]
pub struct WorkingSet<E> {
    mapper: Mapper<E>,
    entities: BTreeMap<Id, E>,
}

impl<E: Mappable> WorkingSet<E> {
    pub fn get(&self, id: &Id) -> Option<&E> {
        self.entities.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entities.values()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Stage a new entity; fails if its key is already present
    pub fn add(&mut self, ctx: &mut Context<'_>, entity: E) -> StoreResult<&mut Self> {
        let id = entity.id();
        let key = self.mapper.key(&id);
        if self.entities.contains_key(&id) || ctx.contains(&key) {
            return Err(StoreError::KeyConflict(id.to_string()));
        }
        ctx.set(key, Mapper::<E>::encode(&entity)?);
        debug!(prefix = self.mapper.prefix, id = %id, "Staged entity add");
        self.entities.insert(id, entity);
        Ok(self)
    }

    /// Stage a whole replacement of an existing entity
    pub fn mutate(&mut self, ctx: &mut Context<'_>, entity: E) -> StoreResult<&mut Self> {
        let id = entity.id();
        if !self.entities.contains_key(&id) {
            return Err(StoreError::KeyMissing(id.to_string()));
        }
        ctx.set(self.mapper.key(&id), Mapper::<E>::encode(&entity)?);
        debug!(prefix = self.mapper.prefix, id = %id, "Staged entity mutate");
        self.entities.insert(id, entity);
        Ok(self)
    }

    /// Stage deletion; the entity reads as absent for the rest of the transaction
    pub fn remove(&mut self, ctx: &mut Context<'_>, entity: &E) -> StoreResult<&mut Self> {
        let id = entity.id();
        if self.entities.remove(&id).is_none() {
            return Err(StoreError::KeyMissing(id.to_string()));
        }
        ctx.delete(self.mapper.key(&id));
        debug!(prefix = self.mapper.prefix, id = %id, "Staged entity remove");
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Header;
    use crate::kv::{KVPairs, MemoryStore};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
    struct Note {
        id: Id,
        body: String,
    }

    impl Mappable for Note {
        fn id(&self) -> Id {
            self.id.clone()
        }
    }

    const NOTES: Mapper<Note> = Mapper::new("notes");

    fn note(id: &str, body: &str) -> Note {
        Note {
            id: Id::new(id),
            body: body.to_string(),
        }
    }

    fn header() -> Header {
        Header::new("test-1", 1)
    }

    #[test]
    fn test_fetch_absent_is_empty() {
        let store = MemoryStore::new();
        let ctx = Context::new(header(), &store);
        let set = NOTES.fetch(&ctx, &Id::new("missing")).unwrap();
        assert!(set.is_empty());
        assert!(set.get(&Id::new("missing")).is_none());
    }

    #[test]
    fn test_add_then_fetch_in_same_transaction() {
        let store = MemoryStore::new();
        let mut ctx = Context::new(header(), &store);

        let mut set = NOTES.fetch(&ctx, &Id::new("a")).unwrap();
        set.add(&mut ctx, note("a", "first")).unwrap();

        let refetched = NOTES.fetch(&ctx, &Id::new("a")).unwrap();
        assert_eq!(refetched.get(&Id::new("a")), Some(&note("a", "first")));
    }

    #[test]
    fn test_add_conflict() {
        let store = MemoryStore::new();
        let mut ctx = Context::new(header(), &store);
        NOTES.create(&mut ctx, &note("a", "first")).unwrap();

        let mut set = NOTES.fetch(&ctx, &Id::new("a")).unwrap();
        let err = set.add(&mut ctx, note("a", "second")).unwrap_err();
        assert_eq!(err, StoreError::KeyConflict("a".into()));
        assert!(matches!(
            NOTES.create(&mut ctx, &note("a", "third")),
            Err(StoreError::KeyConflict(_))
        ));
    }

    #[test]
    fn test_remove_hides_entity() {
        let mut store = MemoryStore::new();
        let mut seed = Context::new(header(), &store);
        NOTES.create(&mut seed, &note("a", "first")).unwrap();
        let change_set = seed.into_change_set();
        store.apply(change_set);

        let mut ctx = Context::new(header(), &store);
        let mut set = NOTES.fetch(&ctx, &Id::new("a")).unwrap();
        let existing = set.get(&Id::new("a")).cloned().unwrap();
        set.remove(&mut ctx, &existing).unwrap();

        assert!(set.get(&Id::new("a")).is_none());
        assert!(NOTES.fetch(&ctx, &Id::new("a")).unwrap().is_empty());
        assert!(matches!(
            set.remove(&mut ctx, &existing),
            Err(StoreError::KeyMissing(_))
        ));
    }

    #[test]
    fn test_mutate_requires_fetched_entity() {
        let store = MemoryStore::new();
        let mut ctx = Context::new(header(), &store);
        let mut set = NOTES.fetch(&ctx, &Id::new("a")).unwrap();
        assert!(matches!(
            set.mutate(&mut ctx, note("a", "x")),
            Err(StoreError::KeyMissing(_))
        ));

        set.add(&mut ctx, note("a", "x")).unwrap();
        set.mutate(&mut ctx, note("a", "y")).unwrap();
        let refetched = NOTES.fetch(&ctx, &Id::new("a")).unwrap();
        assert_eq!(refetched.get(&Id::new("a")).unwrap().body, "y");
    }

    #[test]
    fn test_iterate_in_key_order_with_early_stop() {
        let store = MemoryStore::new();
        let mut ctx = Context::new(header(), &store);
        for id in ["c", "a", "b", "d"] {
            NOTES.create(&mut ctx, &note(id, id)).unwrap();
        }
        let other: Mapper<Note> = Mapper::new("notes2");
        other.create(&mut ctx, &note("z", "other prefix")).unwrap();

        let mut all = Vec::new();
        NOTES
            .iterate(&ctx, &Id::zero(), |n| {
                all.push(n.id.to_string());
                false
            })
            .unwrap();
        assert_eq!(all, vec!["a", "b", "c", "d"]);

        let mut partial = Vec::new();
        NOTES
            .iterate(&ctx, &Id::new("b"), |n| {
                partial.push(n.id.to_string());
                partial.len() == 2
            })
            .unwrap();
        assert_eq!(partial, vec!["b", "c"]);
    }

    /// Committed store that counts the rows its scans hand out
    struct CountingStore {
        inner: MemoryStore,
        rows: Cell<usize>,
    }

    impl KVStore for CountingStore {
        fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
            self.inner.get(key)
        }

        fn scan(&self, prefix: &[u8], start: &[u8]) -> KVPairs<'_> {
            Box::new(
                self.inner
                    .scan(prefix, start)
                    .inspect(move |_| self.rows.set(self.rows.get() + 1)),
            )
        }
    }

    #[test]
    fn test_iterate_reads_only_what_the_visitor_consumes() {
        let mut inner = MemoryStore::new();
        let mut seed = Context::new(header(), &inner);
        for n in 0..1000 {
            NOTES.create(&mut seed, &note(&format!("n{:04}", n), "body")).unwrap();
        }
        let change_set = seed.into_change_set();
        inner.apply(change_set);

        let store = CountingStore {
            inner,
            rows: Cell::new(0),
        };
        let ctx = Context::new(header(), &store);

        let mut seen = Vec::new();
        NOTES
            .iterate(&ctx, &Id::zero(), |n| {
                seen.push(n.id.to_string());
                true
            })
            .unwrap();
        assert_eq!(seen, vec!["n0000"]);
        // one row consumed plus at most one peeked ahead by the merge
        assert!(store.rows.get() <= 2, "read {} rows", store.rows.get());
    }
}
