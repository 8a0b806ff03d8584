// Committed key-value store
//
// The committed store is an ordered map from raw keys to raw values. It is
// read through the `KVStore` trait and written only by applying a `ChangeSet`
// produced by a successful transaction.

use std::collections::BTreeMap;
use std::ops::Bound;

use tracing::debug;

/// Key-value batch operation type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Put a key-value pair
    Put(Vec<u8>, Vec<u8>),
    /// Delete a key
    Delete(Vec<u8>),
}

impl BatchOp {
    pub fn key(&self) -> &[u8] {
        match self {
            BatchOp::Put(key, _) | BatchOp::Delete(key) => key,
        }
    }
}

/// Ordered writes of one transaction, in key order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    ops: Vec<BatchOp>,
}

impl ChangeSet {
    pub fn new(ops: Vec<BatchOp>) -> Self {
        Self { ops }
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Pairs yielded by a scan, produced on demand
pub type KVPairs<'a> = Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + 'a>;

/// Read interface over an ordered key-value store
pub trait KVStore {
    /// Get a value by key
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Check if a key exists
    fn contains(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// All pairs whose key starts with `prefix` and is not below `start`, in key order
    fn scan(&self, prefix: &[u8], start: &[u8]) -> KVPairs<'_>;
}

/// In-memory committed store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the writes of a committed transaction
    pub fn apply(&mut self, change_set: ChangeSet) {
        debug!(ops = change_set.len(), "Applying change set");
        for op in change_set.ops {
            match op {
                BatchOp::Put(key, value) => {
                    self.data.insert(key, value);
                }
                BatchOp::Delete(key) => {
                    self.data.remove(&key);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// BLAKE3 digest over every key and value, length-prefixed, in key order.
    ///
    /// Two stores with the same hash hold byte-identical contents.
    pub fn state_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for (key, value) in &self.data {
            hasher.update(&(key.len() as u64).to_le_bytes());
            hasher.update(key);
            hasher.update(&(value.len() as u64).to_le_bytes());
            hasher.update(value);
        }
        hex::encode(hasher.finalize().as_bytes())
    }
}

impl KVStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.get(key).cloned()
    }

    fn contains(&self, key: &[u8]) -> bool {
        self.data.contains_key(key)
    }

    fn scan(&self, prefix: &[u8], start: &[u8]) -> KVPairs<'_> {
        let lower = if start < prefix { prefix } else { start };
        let prefix = prefix.to_vec();
        Box::new(
            self.data
                .range::<[u8], _>((Bound::Included(lower), Bound::Unbounded))
                .take_while(move |(key, _)| key.starts_with(&prefix))
                .map(|(key, value)| (key.clone(), value.clone())),
        )
    }
}
