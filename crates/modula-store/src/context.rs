// Transaction context
//
// A context is the only handle through which keepers, auxiliaries and
// mappers touch state. It reads through to the committed store and buffers
// every write; nothing reaches the committed store until the host applies
// `into_change_set()` after the transaction succeeds.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Peekable;
use std::ops::Bound;

use modula_schema::Id;

use crate::kv::{BatchOp, ChangeSet, KVPairs, KVStore};

/// Block header the transaction executes under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub chain_id: Id,
    pub height: u64,
}

impl Header {
    pub fn new(chain_id: impl Into<Id>, height: u64) -> Self {
        Self {
            chain_id: chain_id.into(),
            height,
        }
    }
}

/// State-transition scoped view of the store
pub struct Context<'a> {
    header: Header,
    base: &'a dyn KVStore,
    // None marks a staged deletion
    cache: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a> Context<'a> {
    pub fn new(header: Header, base: &'a dyn KVStore) -> Self {
        Self {
            header,
            base,
            cache: BTreeMap::new(),
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn chain_id(&self) -> &Id {
        &self.header.chain_id
    }

    pub fn height(&self) -> u64 {
        self.header.height
    }

    pub fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.cache.insert(key, Some(value));
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.cache.insert(key, None);
    }

    /// Whether any write has been staged
    pub fn is_dirty(&self) -> bool {
        !self.cache.is_empty()
    }

    /// The staged writes in key order
    pub fn into_change_set(self) -> ChangeSet {
        ChangeSet::new(
            self.cache
                .into_iter()
                .map(|(key, value)| match value {
                    Some(value) => BatchOp::Put(key, value),
                    None => BatchOp::Delete(key),
                })
                .collect(),
        )
    }
}

impl KVStore for Context<'_> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.cache.get(key) {
            Some(staged) => staged.clone(),
            None => self.base.get(key),
        }
    }

    fn scan(&self, prefix: &[u8], start: &[u8]) -> KVPairs<'_> {
        let lower = if start < prefix { prefix } else { start };
        let owned_prefix = prefix.to_vec();
        let staged: StagedPairs<'_> = Box::new(
            self.cache
                .range::<[u8], _>((Bound::Included(lower), Bound::Unbounded))
                .take_while(move |(key, _)| key.starts_with(&owned_prefix)),
        );
        let base: KVPairs<'_> = self.base.scan(prefix, start);
        Box::new(MergedScan {
            base: base.peekable(),
            staged: staged.peekable(),
        })
    }
}

type StagedPairs<'a> = Box<dyn Iterator<Item = (&'a Vec<u8>, &'a Option<Vec<u8>>)> + 'a>;

/// Committed pairs overlaid with staged writes, both in key order.
///
/// A staged entry shadows the committed one under the same key; a staged
/// deletion hides it.
struct MergedScan<'a> {
    base: Peekable<KVPairs<'a>>,
    staged: Peekable<StagedPairs<'a>>,
}

impl Iterator for MergedScan<'_> {
    type Item = (Vec<u8>, Vec<u8>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let order = match (self.base.peek(), self.staged.peek()) {
                (None, None) => return None,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some((committed, _)), Some((staged, _))) => committed.as_slice().cmp(staged.as_slice()),
            };
            match order {
                Ordering::Less => return self.base.next(),
                Ordering::Equal => {
                    self.base.next();
                }
                Ordering::Greater => {}
            }
            if let Some((key, Some(value))) = self.staged.next() {
                return Some((key.clone(), value.clone()));
            }
        }
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("header", &self.header)
            .field("staged", &self.cache.len())
            .finish()
    }
}
