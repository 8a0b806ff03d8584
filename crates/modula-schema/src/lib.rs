//! Property, trait and identifier model shared by every Modula module.
//!
//! Entities are described by two disjoint property collections: immutables,
//! fixed at creation, and mutables, replaced wholesale by later transactions.
//! Identifiers are content-addressed: [`derive_id`] hashes a canonical encoding
//! of the chain identifier and both collections, so equal inputs always land on
//! the same ID on every node.

pub mod dec;
pub mod derive;
pub mod fact;
pub mod id;
pub mod properties;
pub mod property;
pub mod traits;

pub use dec::Dec;
pub use derive::{derive_id, ID_ENCODING_TAG};
pub use fact::{Fact, FactType};
pub use id::{Address, Id};
pub use properties::{MetaProperties, Properties};
pub use property::{MetaProperty, Property};
pub use traits::{Immutables, Mutables};

pub use modula_error::{SchemaError, SchemaResult};
