// Typed fact values
//
// A fact is the value half of a property. Revealed facts carry their data;
// scrubbed facts carry only the SHA-256 of the data so that entities can
// commit to a value without exposing it.

use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use modula_error::{SchemaError, SchemaResult};

use crate::dec::Dec;
use crate::id::{Address, Id};

/// Type tag of a [`Fact`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactType {
    String,
    Dec,
    Bool,
    Id,
    Address,
    Hash,
}

impl FactType {
    /// Single letter code used in the compact `code|value` text form
    pub fn code(&self) -> &'static str {
        match self {
            FactType::String => "S",
            FactType::Dec => "D",
            FactType::Bool => "B",
            FactType::Id => "I",
            FactType::Address => "A",
            FactType::Hash => "H",
        }
    }

    pub fn from_code(code: &str) -> SchemaResult<Self> {
        match code {
            "S" => Ok(FactType::String),
            "D" => Ok(FactType::Dec),
            "B" => Ok(FactType::Bool),
            "I" => Ok(FactType::Id),
            "A" => Ok(FactType::Address),
            "H" => Ok(FactType::Hash),
            other => Err(SchemaError::UnknownFactType(other.to_string())),
        }
    }
}

impl fmt::Display for FactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Typed value of a property
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Fact {
    String(String),
    Dec(Dec),
    Bool(bool),
    Id(Id),
    Address(Address),
    /// Digest of a revealed fact
    Hash(Id),
}

impl Fact {
    pub fn fact_type(&self) -> FactType {
        match self {
            Fact::String(_) => FactType::String,
            Fact::Dec(_) => FactType::Dec,
            Fact::Bool(_) => FactType::Bool,
            Fact::Id(_) => FactType::Id,
            Fact::Address(_) => FactType::Address,
            Fact::Hash(_) => FactType::Hash,
        }
    }

    /// Build a fact of the given type from its text value
    pub fn parse(fact_type: FactType, value: &str) -> SchemaResult<Self> {
        match fact_type {
            FactType::String => Ok(Fact::String(value.to_string())),
            FactType::Dec => Ok(Fact::Dec(Dec::parse(value)?)),
            FactType::Bool => match value {
                "true" => Ok(Fact::Bool(true)),
                "false" => Ok(Fact::Bool(false)),
                other => Err(SchemaError::malformed_fact(format!("not a boolean: {}", other))),
            },
            FactType::Id => Ok(Fact::Id(Id::new(value))),
            FactType::Address => Ok(Fact::Address(Address::new(value))),
            FactType::Hash => Ok(Fact::Hash(Id::new(value))),
        }
    }

    /// Parse the compact `code|value` form, e.g. `D|1.5` or `S|active`
    pub fn read(text: &str) -> SchemaResult<Self> {
        let (code, value) = text
            .split_once('|')
            .ok_or_else(|| SchemaError::malformed_fact(format!("missing type code: {}", text)))?;
        Fact::parse(FactType::from_code(code)?, value)
    }

    /// Canonical text of the value, without its type tag
    pub fn value_string(&self) -> String {
        match self {
            Fact::String(value) => value.clone(),
            Fact::Dec(value) => value.to_string(),
            Fact::Bool(value) => value.to_string(),
            Fact::Id(value) | Fact::Hash(value) => value.to_string(),
            Fact::Address(value) => value.to_string(),
        }
    }

    /// Content hash of this fact; a scrubbed fact hashes to itself
    pub fn hash(&self) -> Id {
        if let Fact::Hash(digest) = self {
            return digest.clone();
        }
        let mut hasher = Sha256::new();
        hasher.update(self.fact_type().code().as_bytes());
        hasher.update(b"|");
        hasher.update(self.value_string().as_bytes());
        Id::new(hex::encode(hasher.finalize()))
    }

    /// Replace the value with its digest
    pub fn scrub(&self) -> Fact {
        Fact::Hash(self.hash())
    }

    pub fn is_scrubbed(&self) -> bool {
        matches!(self, Fact::Hash(_))
    }

    pub fn as_dec(&self) -> SchemaResult<&Dec> {
        match self {
            Fact::Dec(value) => Ok(value),
            other => Err(self.mismatch(FactType::Dec, other)),
        }
    }

    pub fn as_id(&self) -> SchemaResult<&Id> {
        match self {
            Fact::Id(value) => Ok(value),
            other => Err(self.mismatch(FactType::Id, other)),
        }
    }

    pub fn as_address(&self) -> SchemaResult<&Address> {
        match self {
            Fact::Address(value) => Ok(value),
            other => Err(self.mismatch(FactType::Address, other)),
        }
    }

    pub fn as_bool(&self) -> SchemaResult<bool> {
        match self {
            Fact::Bool(value) => Ok(*value),
            other => Err(self.mismatch(FactType::Bool, other)),
        }
    }

    fn mismatch(&self, expected: FactType, found: &Fact) -> SchemaError {
        SchemaError::malformed_fact(format!(
            "expected {} fact, found {}|{}",
            expected,
            found.fact_type(),
            found.value_string()
        ))
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.fact_type(), self.value_string())
    }
}
