// Modula Core
//
// Contracts shared by every module: the auxiliary capability registry, the
// transaction and query keeper traits, the module lifecycle, generic genesis
// handling and the host application that drives them.

pub mod application;
pub mod auxiliary;
pub mod config;
pub mod genesis;
pub mod module;
pub mod query;
pub mod registry;
pub mod telemetry;
pub mod transaction;

pub use application::Application;
pub use auxiliary::{request_from, Auxiliary, AuxiliaryKeeper, AuxiliaryRequest, AuxiliaryResponse};
pub use config::{AppConfig, ConfigError, LoggingConfig};
pub use genesis::GenesisState;
pub use module::Module;
pub use query::{handle_query, QueryKeeper, QueryResponse};
pub use registry::AuxiliaryRegistry;
pub use telemetry::{init_logging, init_test_logging};
pub use transaction::{message_from, Message, TransactionKeeper, TransactionResponse};
