//! The ledger modules built on the Modula substrate.
//!
//! Each module owns one entity store and talks to the others only through
//! auxiliaries:
//!
//! - `metas` keeps revealed meta data and scrubs meta properties
//! - `identities` keeps identities and verifies who may act for them
//! - `classifications` keeps the trait schemas entities conform to
//! - `maintainers` keeps per-classification mutation permissions
//! - `exchanges` keeps split balances and moves them in and out of escrow
//! - `orders` keeps open orders and settles them through `exchanges`

#[macro_use]
mod common;

pub mod classifications;
pub mod constants;
pub mod exchanges;
pub mod identities;
pub mod maintainers;
pub mod metas;
pub mod orders;

use modula_core::Module;

pub use classifications::ClassificationsModule;
pub use exchanges::ExchangesModule;
pub use identities::IdentitiesModule;
pub use maintainers::MaintainersModule;
pub use metas::MetasModule;
pub use orders::OrdersModule;

/// Every module, in genesis order
pub fn modules() -> Vec<Box<dyn Module>> {
    vec![
        Box::new(MetasModule::new()),
        Box::new(IdentitiesModule::new()),
        Box::new(ClassificationsModule::new()),
        Box::new(MaintainersModule::new()),
        Box::new(ExchangesModule::new()),
        Box::new(OrdersModule::new()),
    ]
}
