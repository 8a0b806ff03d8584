// Schema error types
// Errors raised while building properties, facts and identifiers

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ErrorCode, ErrorDomain, LedgerError};

/// Schema error codes
pub mod codes {
    use crate::ErrorCode;

    // Schema error codes start with 1000
    pub const DUPLICATE_PROPERTY: ErrorCode = ErrorCode(1001);
    pub const PROPERTY_NOT_FOUND: ErrorCode = ErrorCode(1002);
    pub const MALFORMED_DECIMAL: ErrorCode = ErrorCode(1003);
    pub const MALFORMED_FACT: ErrorCode = ErrorCode(1004);
    pub const UNKNOWN_FACT_TYPE: ErrorCode = ErrorCode(1005);
    pub const ENCODING_ERROR: ErrorCode = ErrorCode(1006);
}

/// Errors from the property and identifier model
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaError {
    /// A property with the same ID already exists in the collection
    #[error("Duplicate property: {0}")]
    DuplicateProperty(String),

    /// A property expected in a collection is absent
    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    /// A decimal value could not be parsed or overflowed its precision
    #[error("Malformed decimal: {0}")]
    MalformedDecimal(String),

    /// A fact has the wrong type or an unparseable value
    #[error("Malformed fact: {0}")]
    MalformedFact(String),

    /// A fact type tag is not known
    #[error("Unknown fact type: {0}")]
    UnknownFactType(String),

    /// Canonical encoding failed
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl LedgerError for SchemaError {
    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            SchemaError::DuplicateProperty(_) => DUPLICATE_PROPERTY,
            SchemaError::PropertyNotFound(_) => PROPERTY_NOT_FOUND,
            SchemaError::MalformedDecimal(_) => MALFORMED_DECIMAL,
            SchemaError::MalformedFact(_) => MALFORMED_FACT,
            SchemaError::UnknownFactType(_) => UNKNOWN_FACT_TYPE,
            SchemaError::Encoding(_) => ENCODING_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SchemaError::DuplicateProperty(_) => "SCHEMA_DUPLICATE_PROPERTY",
            SchemaError::PropertyNotFound(_) => "SCHEMA_PROPERTY_NOT_FOUND",
            SchemaError::MalformedDecimal(_) => "SCHEMA_MALFORMED_DECIMAL",
            SchemaError::MalformedFact(_) => "SCHEMA_MALFORMED_FACT",
            SchemaError::UnknownFactType(_) => "SCHEMA_UNKNOWN_FACT_TYPE",
            SchemaError::Encoding(_) => "SCHEMA_ENCODING_ERROR",
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Schema
    }
}

/// Convenient Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

impl SchemaError {
    /// Create a new malformed decimal error
    pub fn malformed_decimal(message: impl Into<String>) -> Self {
        SchemaError::MalformedDecimal(message.into())
    }

    /// Create a new malformed fact error
    pub fn malformed_fact(message: impl Into<String>) -> Self {
        SchemaError::MalformedFact(message.into())
    }
}
