// Modula Store
//
// Keyed entity storage scoped to a single state transition. Modules never
// write to the committed store directly: every write lands in a transaction
// `Context`, and the host applies the resulting `ChangeSet` only when the
// transaction succeeds.

pub mod context;
pub mod kv;
pub mod mapper;

pub use context::{Context, Header};
pub use kv::{BatchOp, ChangeSet, KVPairs, KVStore, MemoryStore};
pub use mapper::{Mappable, Mapper, WorkingSet};

pub use modula_error::{StoreError, StoreResult};
