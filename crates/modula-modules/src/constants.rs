// Well-known names shared between modules

/// Auxiliary names. Each is provided by exactly one module.
pub mod auxiliaries {
    pub const SCRUB: &str = "scrub";
    pub const VERIFY: &str = "verify";
    pub const CONFORM: &str = "conform";
    pub const SUPER: &str = "super";
    pub const MAINTAIN: &str = "maintain";
    pub const CUSTODY: &str = "custody";
    pub const REVERSE: &str = "reverse";
    pub const TRANSFER: &str = "transfer";
}

/// Property IDs the modules set themselves
pub mod properties {
    pub const MAKER_ID: &str = "makerID";
    pub const MAKER_SPLIT_ID: &str = "makerSplitID";
    pub const TAKER_SPLIT_ID: &str = "takerSplitID";
    pub const EXCHANGE_RATE: &str = "exchangeRate";
    pub const MAKER_SPLIT: &str = "makerSplit";
    pub const OWNER_ID: &str = "ownerID";
    pub const OWNABLE_ID: &str = "ownableID";
    pub const CLASSIFICATION_ID: &str = "classificationID";
    pub const IDENTITY_ID: &str = "identityID";
}
