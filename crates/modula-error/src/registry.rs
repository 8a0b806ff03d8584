// Registry error types
// Configuration errors raised while wiring auxiliaries and modules at startup

use thiserror::Error;

use crate::{ErrorCode, ErrorDomain, LedgerError};

/// Registry error codes
pub mod codes {
    use crate::ErrorCode;

    // Registry error codes start with 4000
    pub const DUPLICATE_AUXILIARY: ErrorCode = ErrorCode(4001);
    pub const UNBOUND_AUXILIARY: ErrorCode = ErrorCode(4002);
    pub const DUPLICATE_MODULE: ErrorCode = ErrorCode(4003);
    pub const UNKNOWN_MODULE: ErrorCode = ErrorCode(4004);
    pub const INVALID_CONFIG: ErrorCode = ErrorCode(4005);
}

/// Errors detected while building the capability registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two provided auxiliaries share a name
    #[error("Duplicate registration for auxiliary: {0}")]
    DuplicateAuxiliary(String),

    /// A keeper requires an auxiliary that nobody provided
    #[error("Keeper {keeper} requires unbound auxiliary {auxiliary}")]
    UnboundAuxiliary { keeper: String, auxiliary: String },

    /// Two modules share a name
    #[error("Duplicate registration for module: {0}")]
    DuplicateModule(String),

    /// A route names no registered module
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    /// The host configuration failed validation
    #[error("Startup configuration rejected: {0}")]
    InvalidConfig(String),
}

impl LedgerError for RegistryError {
    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            RegistryError::DuplicateAuxiliary(_) => DUPLICATE_AUXILIARY,
            RegistryError::UnboundAuxiliary { .. } => UNBOUND_AUXILIARY,
            RegistryError::DuplicateModule(_) => DUPLICATE_MODULE,
            RegistryError::UnknownModule(_) => UNKNOWN_MODULE,
            RegistryError::InvalidConfig(_) => INVALID_CONFIG,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RegistryError::DuplicateAuxiliary(_) => "REGISTRY_DUPLICATE_AUXILIARY",
            RegistryError::UnboundAuxiliary { .. } => "REGISTRY_UNBOUND_AUXILIARY",
            RegistryError::DuplicateModule(_) => "REGISTRY_DUPLICATE_MODULE",
            RegistryError::UnknownModule(_) => "REGISTRY_UNKNOWN_MODULE",
            RegistryError::InvalidConfig(_) => "REGISTRY_INVALID_CONFIG",
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Registry
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

impl RegistryError {
    /// Create an unbound auxiliary error for the given keeper
    pub fn unbound(keeper: impl Into<String>, auxiliary: impl Into<String>) -> Self {
        RegistryError::UnboundAuxiliary {
            keeper: keeper.into(),
            auxiliary: auxiliary.into(),
        }
    }
}
