// Order transactions
//
// make:   verify, scrub, scrub, must-not-exist, custody, add
// cancel: must-exist, read terms, verify maker, reverse, remove
// take:   verify, must-exist, read terms, transfer taker to maker,
//         reverse escrow to taker, replace or remove when filled

use serde::{Deserialize, Serialize};
use tracing::info;

use modula_core::{
    message_from, Auxiliary, AuxiliaryRegistry, Message, TransactionKeeper, TransactionResponse,
};
use modula_error::{ModuleError, ModuleResult, RegistryResult};
use modula_schema::{
    derive_id, Address, Dec, Fact, Id, Immutables, MetaProperties, Mutables, Properties, Property,
};
use modula_store::{Context, Mapper, WorkingSet};

use crate::common::{reject_reserved, scrub_and_compose};
use crate::constants::auxiliaries::{CUSTODY, REVERSE, SCRUB, TRANSFER, VERIFY};
use crate::constants::properties::{EXCHANGE_RATE, MAKER_ID, MAKER_SPLIT, MAKER_SPLIT_ID, TAKER_SPLIT_ID};
use crate::exchanges::auxiliaries::{CustodyRequest, ReverseRequest, TransferRequest};
use crate::identities::auxiliaries::VerifyRequest;

use super::mapper::Order;
use super::MODULE_NAME;

const RESERVED: [&str; 5] = [MAKER_ID, MAKER_SPLIT_ID, TAKER_SPLIT_ID, EXCHANGE_RATE, MAKER_SPLIT];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeMessage {
    pub from: Address,
    pub from_id: Id,
    /// Ownable the maker escrows
    pub maker_split_id: Id,
    /// Ownable the maker asks for
    pub taker_split_id: Id,
    pub exchange_rate: Dec,
    pub maker_split: Dec,
    pub immutable_meta_properties: MetaProperties,
    pub immutable_properties: Properties,
    pub mutable_meta_properties: MetaProperties,
    pub mutable_properties: Properties,
}

message!(MakeMessage, MODULE_NAME, "make");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelMessage {
    pub from: Address,
    pub order_id: Id,
}

message!(CancelMessage, MODULE_NAME, "cancel");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeMessage {
    pub from: Address,
    pub from_id: Id,
    pub order_id: Id,
    /// Taker units paid to the maker
    pub taker_split: Dec,
}

message!(TakeMessage, MODULE_NAME, "take");

fn fetch_existing(
    mapper: &Mapper<Order>,
    ctx: &Context<'_>,
    order_id: &Id,
) -> ModuleResult<(WorkingSet<Order>, Order)> {
    let orders = mapper.fetch(ctx, order_id)?;
    let order = orders
        .get(order_id)
        .cloned()
        .ok_or_else(|| ModuleError::entity_not_found(order_id.to_string()))?;
    Ok((orders, order))
}

pub struct MakeKeeper {
    mapper: Mapper<Order>,
    verify: Auxiliary,
    scrub: Auxiliary,
    custody: Auxiliary,
}

impl MakeKeeper {
    pub fn initialize(mapper: Mapper<Order>, registry: &AuxiliaryRegistry) -> RegistryResult<Self> {
        Ok(Self {
            mapper,
            verify: registry.resolve("orders/make", VERIFY)?,
            scrub: registry.resolve("orders/make", SCRUB)?,
            custody: registry.resolve("orders/make", CUSTODY)?,
        })
    }

    fn make(&self, ctx: &mut Context<'_>, message: &MakeMessage) -> ModuleResult<Option<Id>> {
        self.verify
            .help(ctx, &VerifyRequest::new(message.from.clone(), message.from_id.clone()))
            .into_result()?;

        if !message.maker_split.is_positive() || !message.exchange_rate.is_positive() {
            return Err(ModuleError::incorrect_message("maker split and exchange rate must be positive"));
        }

        let mut immutables = scrub_and_compose(
            &self.scrub,
            ctx,
            &message.immutable_meta_properties,
            &message.immutable_properties,
        )?;
        let mut mutables = scrub_and_compose(
            &self.scrub,
            ctx,
            &message.mutable_meta_properties,
            &message.mutable_properties,
        )?;
        reject_reserved(&immutables, &RESERVED)?;
        reject_reserved(&mutables, &RESERVED)?;

        immutables.add(Property::new(MAKER_ID, Fact::Id(message.from_id.clone())))?;
        immutables.add(Property::new(MAKER_SPLIT_ID, Fact::Id(message.maker_split_id.clone())))?;
        immutables.add(Property::new(TAKER_SPLIT_ID, Fact::Id(message.taker_split_id.clone())))?;
        immutables.add(Property::new(EXCHANGE_RATE, Fact::Dec(message.exchange_rate.clone())))?;
        mutables.add(Property::new(MAKER_SPLIT, Fact::Dec(message.maker_split.clone())))?;
        let immutables = Immutables::new(immutables);
        let mutables = Mutables::new(mutables);

        let id = derive_id(ctx.chain_id(), &immutables, &mutables)?;
        let mut orders = self.mapper.fetch(ctx, &id)?;
        if orders.get(&id).is_some() {
            return Err(ModuleError::entity_already_exists(id.to_string()));
        }

        self.custody
            .help(
                ctx,
                &CustodyRequest::new(
                    message.from_id.clone(),
                    message.maker_split_id.clone(),
                    message.maker_split.clone(),
                ),
            )
            .into_result()?;

        orders.add(
            ctx,
            Order {
                id: id.clone(),
                immutables,
                mutables,
            },
        )?;

        info!(order_id = %id, maker_id = %message.from_id, "Made order");
        Ok(Some(id))
    }
}

impl TransactionKeeper for MakeKeeper {
    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        message_from::<MakeMessage>(message)
            .and_then(|message| self.make(ctx, message))
            .into()
    }
}

pub struct CancelKeeper {
    mapper: Mapper<Order>,
    verify: Auxiliary,
    reverse: Auxiliary,
}

impl CancelKeeper {
    pub fn initialize(mapper: Mapper<Order>, registry: &AuxiliaryRegistry) -> RegistryResult<Self> {
        Ok(Self {
            mapper,
            verify: registry.resolve("orders/cancel", VERIFY)?,
            reverse: registry.resolve("orders/cancel", REVERSE)?,
        })
    }

    fn cancel(&self, ctx: &mut Context<'_>, message: &CancelMessage) -> ModuleResult<Option<Id>> {
        let (mut orders, order) = fetch_existing(&self.mapper, ctx, &message.order_id)?;
        let terms = order.terms()?;

        self.verify
            .help(ctx, &VerifyRequest::new(message.from.clone(), terms.maker_id.clone()))
            .into_result()?;
        self.reverse
            .help(
                ctx,
                &ReverseRequest::new(terms.maker_id.clone(), terms.maker_split_id, terms.maker_split),
            )
            .into_result()?;

        orders.remove(ctx, &order)?;
        info!(order_id = %message.order_id, maker_id = %terms.maker_id, "Cancelled order");
        Ok(None)
    }
}

impl TransactionKeeper for CancelKeeper {
    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        message_from::<CancelMessage>(message)
            .and_then(|message| self.cancel(ctx, message))
            .into()
    }
}

pub struct TakeKeeper {
    mapper: Mapper<Order>,
    verify: Auxiliary,
    transfer: Auxiliary,
    reverse: Auxiliary,
}

impl TakeKeeper {
    pub fn initialize(mapper: Mapper<Order>, registry: &AuxiliaryRegistry) -> RegistryResult<Self> {
        Ok(Self {
            mapper,
            verify: registry.resolve("orders/take", VERIFY)?,
            transfer: registry.resolve("orders/take", TRANSFER)?,
            reverse: registry.resolve("orders/take", REVERSE)?,
        })
    }

    fn take(&self, ctx: &mut Context<'_>, message: &TakeMessage) -> ModuleResult<Option<Id>> {
        self.verify
            .help(ctx, &VerifyRequest::new(message.from.clone(), message.from_id.clone()))
            .into_result()?;

        let (mut orders, mut order) = fetch_existing(&self.mapper, ctx, &message.order_id)?;
        let terms = order.terms()?;

        if !message.taker_split.is_positive() {
            return Err(ModuleError::incorrect_message("taker split must be positive"));
        }
        let maker_amount = message.taker_split.mul(&terms.exchange_rate);
        if maker_amount.is_zero() {
            return Err(ModuleError::incorrect_message(format!(
                "{} at rate {} buys nothing",
                message.taker_split, terms.exchange_rate
            )));
        }
        if maker_amount > terms.maker_split {
            return Err(ModuleError::insufficient_balance(format!(
                "order {} has {} left, take needs {}",
                message.order_id, terms.maker_split, maker_amount
            )));
        }

        self.transfer
            .help(
                ctx,
                &TransferRequest::new(
                    message.from_id.clone(),
                    terms.maker_id.clone(),
                    terms.taker_split_id.clone(),
                    message.taker_split.clone(),
                ),
            )
            .into_result()?;
        self.reverse
            .help(
                ctx,
                &ReverseRequest::new(message.from_id.clone(), terms.maker_split_id.clone(), maker_amount.clone()),
            )
            .into_result()?;

        let remaining = terms.maker_split.sub(&maker_amount);
        if remaining.is_zero() {
            orders.remove(ctx, &order)?;
            info!(order_id = %message.order_id, taker_id = %message.from_id, "Filled order");
        } else {
            let update = Properties::from_list([Property::new(MAKER_SPLIT, Fact::Dec(remaining.clone()))]);
            order.mutables = order.mutables.mutate(&update);
            orders.mutate(ctx, order)?;
            info!(order_id = %message.order_id, taker_id = %message.from_id, remaining = %remaining, "Took from order");
        }
        Ok(None)
    }
}

impl TransactionKeeper for TakeKeeper {
    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        message_from::<TakeMessage>(message)
            .and_then(|message| self.take(ctx, message))
            .into()
    }
}
