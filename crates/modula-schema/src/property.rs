// Single property types
//
// A property pairs an ID with a fact. Meta properties carry revealed data and
// become ordinary properties once scrubbed.

use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use modula_error::{SchemaError, SchemaResult};

use crate::fact::Fact;
use crate::id::Id;

/// One trait of an entity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Property {
    pub id: Id,
    pub fact: Fact,
}

impl Property {
    pub fn new(id: impl Into<Id>, fact: Fact) -> Self {
        Self { id: id.into(), fact }
    }

    /// Parse the `id:code|value` form, e.g. `status:S|active`
    pub fn read(text: &str) -> SchemaResult<Self> {
        let (id, fact) = text
            .split_once(':')
            .ok_or_else(|| SchemaError::malformed_fact(format!("missing property id: {}", text)))?;
        if id.is_empty() {
            return Err(SchemaError::malformed_fact(format!("empty property id: {}", text)));
        }
        Ok(Property::new(id, Fact::read(fact)?))
    }

    /// Same property with its fact replaced by the fact's digest
    pub fn scrub(&self) -> Property {
        Property::new(self.id.clone(), self.fact.scrub())
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.fact)
    }
}

/// A property whose data is revealed in the message that carries it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct MetaProperty {
    pub id: Id,
    pub data: Fact,
}

impl MetaProperty {
    pub fn new(id: impl Into<Id>, data: Fact) -> Self {
        Self { id: id.into(), data }
    }

    pub fn read(text: &str) -> SchemaResult<Self> {
        let Property { id, fact } = Property::read(text)?;
        Ok(MetaProperty { id, data: fact })
    }

    /// The stored form of this meta property
    pub fn scrub(&self) -> Property {
        Property::new(self.id.clone(), self.data.scrub())
    }

    /// The revealed property, unscrubbed
    pub fn property(&self) -> Property {
        Property::new(self.id.clone(), self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dec::Dec;

    #[test]
    fn test_read_property() {
        let property = Property::read("makerSplit:D|10").unwrap();
        assert_eq!(property.id, Id::new("makerSplit"));
        assert_eq!(property.fact, Fact::Dec(Dec::from_integer(10)));
        assert_eq!(property.to_string(), "makerSplit:D|10");
        assert!(Property::read(":S|x").is_err());
        assert!(Property::read("S|x").is_err());
    }

    #[test]
    fn test_meta_scrub_keeps_id() {
        let meta = MetaProperty::read("name:S|alice").unwrap();
        let scrubbed = meta.scrub();
        assert_eq!(scrubbed.id, meta.id);
        assert_eq!(scrubbed.fact, Fact::Hash(meta.data.hash()));
        assert_eq!(meta.property().fact, Fact::String("alice".into()));
    }
}
