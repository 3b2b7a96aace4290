use soroban_sdk::{contracterror, contracttype, Address};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum StakingError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    AmountBelowMinimum = 5,
    NoActivePosition = 6,
    InsufficientStake = 7,
    StillLocked = 8,
    NothingToClaim = 9,
    NoFreeClaim = 10,
    VenueShortfall = 11,
    InvalidPackage = 12,
    AlreadyConfigured = 13,
    ArithmeticOverflow = 14,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum StakeTier {
    Basic = 0,
    Silver = 1,
    Gold = 2,
    Platinum = 3,
}

impl StakeTier {
    pub const ALL: [StakeTier; 4] = [
        StakeTier::Basic,
        StakeTier::Silver,
        StakeTier::Gold,
        StakeTier::Platinum,
    ];

    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn next(self) -> Option<StakeTier> {
        match self {
            StakeTier::Basic => Some(StakeTier::Silver),
            StakeTier::Silver => Some(StakeTier::Gold),
            StakeTier::Gold => Some(StakeTier::Platinum),
            StakeTier::Platinum => None,
        }
    }

    pub fn prev(self) -> Option<StakeTier> {
        match self {
            StakeTier::Basic => None,
            StakeTier::Silver => Some(StakeTier::Basic),
            StakeTier::Gold => Some(StakeTier::Silver),
            StakeTier::Platinum => Some(StakeTier::Gold),
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakePackage {
    pub min_stake: i128,
    pub lock_duration: u64,
    pub yield_rate_bps: u32,
    pub free_claims: u32,
    pub active: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakingPosition {
    pub staker: Address,
    pub amount: i128,
    pub deployed: i128,
    pub tier: StakeTier,
    pub stake_start: u64,
    pub unlock_time: u64,
    pub yield_rate_bps: u32,
    pub claims_used: u32,
    pub claims_allowed: u32,
    pub accrued_yield: i128,
    pub last_accrual: u64,
    pub total_yield_claimed: i128,
    pub active: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub admin: Address,
    pub staking_token: Address,
    pub yield_venue: Address,
    pub badge: Address,
    pub allocation_bps: u32,
    pub policy_ledger: Option<Address>,
    pub subsidy_pool: Option<Address>,
}

#[contracttype]
pub enum DataKey {
    Config,
    Package(StakeTier),
    Position(Address),
    TotalStaked,
}
