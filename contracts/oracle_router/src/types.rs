use soroban_sdk::{contracterror, contracttype, Address, BytesN};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RouterError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    NotFound = 4,
    Paused = 5,
    RequestPending = 6,
    InvalidRouting = 7,
}

/// Parameters the off-chain relay needs to route a request to the oracle
/// network.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoutingParams {
    pub subscription_id: u64,
    pub gas_limit: u32,
    pub don_id: BytesN<32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub admin: Address,
    pub consumer: Address,
    pub relay_key: BytesN<32>,
    pub routing: RoutingParams,
    pub paused: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestEntry {
    pub request_id: BytesN<32>,
    pub policy_id: u64,
    pub sent_at: u64,
    pub fulfilled: bool,
    pub fulfilled_at: u64,
}

/// Decoded oracle answer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DelayReport {
    pub delay_occurred: bool,
    pub delay_minutes: u64,
}

impl DelayReport {
    pub const NONE: DelayReport = DelayReport {
        delay_occurred: false,
        delay_minutes: 0,
    };
}
