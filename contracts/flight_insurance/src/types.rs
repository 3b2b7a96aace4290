use soroban_sdk::{contracterror, contracttype, Address, BytesN};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum InsuranceError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    Paused = 4,
    TierInactive = 5,
    DuplicateActivePolicy = 6,
    InvalidTimeWindow = 7,
    PolicyNotFound = 8,
    NotHolder = 9,
    PolicyNotActive = 10,
    TooEarly = 11,
    WindowExpired = 12,
    InsufficientPoolFunds = 13,
    InvalidParameter = 14,
    InvalidAmount = 15,
    ArithmeticOverflow = 16,
    AlreadyConfigured = 17,
    SubsidyNotConfigured = 18,
    NoFreeClaim = 19,
    SubsidyUnavailable = 20,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum PolicyTier {
    Basic = 0,
    Silver = 1,
    Gold = 2,
    Platinum = 3,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PolicyStatus {
    Active = 1,
    Claimable = 2,
    PaidOut = 3,
    Expired = 4,
}

/// Pricing and risk template for one tier. Copied into a policy at purchase.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TierConfig {
    pub payout: i128,
    pub premium_multiplier: u32, // percent, 100 = 1x
    pub threshold_minutes: u64,
    pub probability_bps: u32,
    pub margin_bps: u32,
    pub active: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TierPricing {
    pub tier: PolicyTier,
    pub payout: i128,
    pub premium: i128,
    pub threshold_minutes: u64,
    pub probability_bps: u32,
    pub margin_bps: u32,
    pub premium_multiplier: u32,
    pub active: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Policy {
    pub id: u64,
    pub holder: Address,
    pub flight_hash: BytesN<32>,
    pub tier: PolicyTier,
    pub departure_time: u64,
    pub expiry: u64,
    pub threshold_minutes: u64,
    pub premium: i128,
    pub payout: i128,
    pub status: PolicyStatus,
    pub subsidized: bool,
    pub purchased_at: u64,
    pub settled_at: u64, // 0 until terminal
    pub last_request_id: Option<BytesN<32>>,
    pub reported_delay_minutes: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub admin: Address,
    pub payout_token: Address,
    pub oracle_router: Address,
    pub staking_ledger: Option<Address>,
    pub subsidy_pool: Option<Address>,
    pub expiry_window: u64,
    pub paused: bool,
}

/// Snapshot for solvency monitoring. Liability is not capped by the ledger.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SolvencyReport {
    pub available_balance: i128,
    pub outstanding_liability: i128,
    pub active_policies: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Config,
    TierConfig(PolicyTier),
    Policy(u64),
    PolicyCounter,
    ActiveIndex(Address, BytesN<32>),
    UserPolicies(Address),
    PoolBalance,
    OutstandingLiability,
    ActivePolicies,
}
