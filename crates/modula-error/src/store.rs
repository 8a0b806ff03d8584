// Store error types
// These errors never carry domain meaning; keepers classify existence violations themselves

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ErrorCode, ErrorDomain, LedgerError};

/// Store error codes
pub mod codes {
    use crate::ErrorCode;

    // Store error codes start with 2000
    pub const ENCODE_ERROR: ErrorCode = ErrorCode(2001);
    pub const DECODE_ERROR: ErrorCode = ErrorCode(2002);
    pub const KEY_CONFLICT: ErrorCode = ErrorCode(2003);
    pub const KEY_MISSING: ErrorCode = ErrorCode(2004);
}

/// Errors from the keyed entity store
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreError {
    /// An entity could not be encoded for storage
    #[error("Encode error: {0}")]
    Encode(String),

    /// Stored bytes could not be decoded into an entity
    #[error("Decode error: {0}")]
    Decode(String),

    /// A staged add targeted a key that is already present
    #[error("Key conflict: {0}")]
    KeyConflict(String),

    /// A staged mutate or remove targeted a key that is absent
    #[error("Key missing: {0}")]
    KeyMissing(String),
}

impl LedgerError for StoreError {
    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            StoreError::Encode(_) => ENCODE_ERROR,
            StoreError::Decode(_) => DECODE_ERROR,
            StoreError::KeyConflict(_) => KEY_CONFLICT,
            StoreError::KeyMissing(_) => KEY_MISSING,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            StoreError::Encode(_) => "STORE_ENCODE_ERROR",
            StoreError::Decode(_) => "STORE_DECODE_ERROR",
            StoreError::KeyConflict(_) => "STORE_KEY_CONFLICT",
            StoreError::KeyMissing(_) => "STORE_KEY_MISSING",
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Store
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
