//! Content-addressed identifier derivation.
//!
//! The preimage is the Borsh encoding of a version tag, the chain identifier
//! and both trait sets. [`Properties`](crate::Properties) encode in ID order,
//! so the result does not depend on the order traits were supplied in.

use modula_error::{SchemaError, SchemaResult};

use crate::id::Id;
use crate::traits::{Immutables, Mutables};

/// Domain separation tag mixed into every derived ID
pub const ID_ENCODING_TAG: &str = "modula.id.v1";

/// Derive the identifier of an entity from its chain and creation traits.
///
/// Empty trait sets are legal and yield a fixed ID for the chain.
pub fn derive_id(chain_id: &Id, immutables: &Immutables, mutables: &Mutables) -> SchemaResult<Id> {
    let preimage = borsh::to_vec(&(ID_ENCODING_TAG, chain_id, immutables, mutables))
        .map_err(|e| SchemaError::Encoding(e.to_string()))?;

    let mut hasher = blake3::Hasher::new();
    hasher.update(&preimage);
    let hash = hasher.finalize();

    Ok(Id::new(hex::encode(hash.as_bytes())))
}
