// Module error types
// Classified errors returned by transaction keepers, query keepers and auxiliaries.
// These are carried verbatim from the failing step to the host ledger.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ErrorCode, ErrorDomain, LedgerError, SchemaError, StoreError};

/// Module error codes
pub mod codes {
    use crate::ErrorCode;

    // Module error codes start with 3000
    pub const ENTITY_ALREADY_EXISTS: ErrorCode = ErrorCode(3001);
    pub const ENTITY_NOT_FOUND: ErrorCode = ErrorCode(3002);
    pub const NOT_AUTHORIZED: ErrorCode = ErrorCode(3003);
    pub const INSUFFICIENT_BALANCE: ErrorCode = ErrorCode(3004);
    pub const INCORRECT_MESSAGE: ErrorCode = ErrorCode(3005);
    pub const INCORRECT_FORMAT: ErrorCode = ErrorCode(3006);
    pub const INVALID_REQUEST: ErrorCode = ErrorCode(3007);
    pub const NON_CONFORMING_TRAITS: ErrorCode = ErrorCode(3008);
    pub const UNINITIALIZED: ErrorCode = ErrorCode(3009);
}

/// User-visible error of a transaction or query
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleError {
    /// Create targeted an ID that is already stored
    #[error("Entity already exists: {0}")]
    EntityAlreadyExists(String),

    /// Mutate, cancel or lookup targeted an ID that is not stored
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// The signer is not allowed to act for the referenced identity
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// A split balance is too small for the requested debit
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    /// The message routed to a keeper has the wrong shape
    #[error("Incorrect message: {0}")]
    IncorrectMessage(String),

    /// A value derived from stored facts could not be interpreted
    #[error("Incorrect format: {0}")]
    IncorrectFormat(String),

    /// An auxiliary or query request failed its own validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Traits do not match the property set of their classification
    #[error("Non-conforming traits: {0}")]
    NonConformingTraits(String),

    /// The module was used before its keepers were initialized
    #[error("Module not initialized: {0}")]
    Uninitialized(String),

    /// Schema error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl LedgerError for ModuleError {
    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            ModuleError::EntityAlreadyExists(_) => ENTITY_ALREADY_EXISTS,
            ModuleError::EntityNotFound(_) => ENTITY_NOT_FOUND,
            ModuleError::NotAuthorized(_) => NOT_AUTHORIZED,
            ModuleError::InsufficientBalance(_) => INSUFFICIENT_BALANCE,
            ModuleError::IncorrectMessage(_) => INCORRECT_MESSAGE,
            ModuleError::IncorrectFormat(_) => INCORRECT_FORMAT,
            ModuleError::InvalidRequest(_) => INVALID_REQUEST,
            ModuleError::NonConformingTraits(_) => NON_CONFORMING_TRAITS,
            ModuleError::Uninitialized(_) => UNINITIALIZED,
            ModuleError::Schema(inner) => inner.code(),
            ModuleError::Store(inner) => inner.code(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ModuleError::EntityAlreadyExists(_) => "MODULE_ENTITY_ALREADY_EXISTS",
            ModuleError::EntityNotFound(_) => "MODULE_ENTITY_NOT_FOUND",
            ModuleError::NotAuthorized(_) => "MODULE_NOT_AUTHORIZED",
            ModuleError::InsufficientBalance(_) => "MODULE_INSUFFICIENT_BALANCE",
            ModuleError::IncorrectMessage(_) => "MODULE_INCORRECT_MESSAGE",
            ModuleError::IncorrectFormat(_) => "MODULE_INCORRECT_FORMAT",
            ModuleError::InvalidRequest(_) => "MODULE_INVALID_REQUEST",
            ModuleError::NonConformingTraits(_) => "MODULE_NON_CONFORMING_TRAITS",
            ModuleError::Uninitialized(_) => "MODULE_UNINITIALIZED",
            ModuleError::Schema(inner) => inner.error_code(),
            ModuleError::Store(inner) => inner.error_code(),
        }
    }

    fn domain(&self) -> ErrorDomain {
        match self {
            ModuleError::Schema(_) => ErrorDomain::Schema,
            ModuleError::Store(_) => ErrorDomain::Store,
            _ => ErrorDomain::Module,
        }
    }
}

/// Convenient Result type for module operations
pub type ModuleResult<T> = Result<T, ModuleError>;

// Helper methods for creating module errors
impl ModuleError {
    /// Create an entity-already-exists error for the given ID
    pub fn entity_already_exists(id: impl Into<String>) -> Self {
        ModuleError::EntityAlreadyExists(id.into())
    }

    /// Create an entity-not-found error for the given ID
    pub fn entity_not_found(id: impl Into<String>) -> Self {
        ModuleError::EntityNotFound(id.into())
    }

    /// Create a not-authorized error with the given reason
    pub fn not_authorized(reason: impl Into<String>) -> Self {
        ModuleError::NotAuthorized(reason.into())
    }

    /// Create an insufficient-balance error with the given reason
    pub fn insufficient_balance(reason: impl Into<String>) -> Self {
        ModuleError::InsufficientBalance(reason.into())
    }

    /// Create an incorrect-message error naming the expected message kind
    pub fn incorrect_message(expected: impl Into<String>) -> Self {
        ModuleError::IncorrectMessage(expected.into())
    }

    /// Create an incorrect-format error with the given reason
    pub fn incorrect_format(reason: impl Into<String>) -> Self {
        ModuleError::IncorrectFormat(reason.into())
    }

    /// Create an invalid-request error with the given reason
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        ModuleError::InvalidRequest(reason.into())
    }

    /// Whether this error reports an existence violation in the store
    pub fn is_store_consistency(&self) -> bool {
        matches!(
            self,
            ModuleError::EntityAlreadyExists(_) | ModuleError::EntityNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_errors_keep_their_code() {
        let err: ModuleError = SchemaError::malformed_decimal("1.2.3").into();
        assert_eq!(err.code(), crate::schema::codes::MALFORMED_DECIMAL);
        assert_eq!(err.domain(), ErrorDomain::Schema);
        assert_eq!(err.error_code(), "SCHEMA_MALFORMED_DECIMAL");
    }

    #[test]
    fn test_store_consistency_classification() {
        assert!(ModuleError::entity_not_found("x").is_store_consistency());
        assert!(ModuleError::entity_already_exists("x").is_store_consistency());
        assert!(!ModuleError::not_authorized("x").is_store_consistency());
    }

    #[test]
    fn test_serialized_error_survives_json() {
        let err = ModuleError::insufficient_balance("split stake");
        let json = serde_json::to_string(&err).unwrap();
        let decoded: ModuleError = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, err);
    }
}
