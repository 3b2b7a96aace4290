#![no_std]
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Env,
};

/// Highest tier index the staking ledger issues.
pub const MAX_TIER: u32 = 3;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum BadgeError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    NotFound = 4,
    InvalidTier = 5,
}

/// Non-transferable record of the highest staking tier an owner reached.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TierBadge {
    pub token_id: u32,
    pub owner: Address,
    pub tier: u32,
    pub issued_at: u64,
    pub upgraded_at: u64,
}

#[contracttype]
pub enum DataKey {
    Badge(u32),          // Persistent
    BadgeOf(Address),    // Persistent
    NextTokenId,         // Instance
    TotalSupply,         // Instance
    Admin,               // Instance
    Minter,              // Instance
}

#[contract]
pub struct TierBadgeContract;

#[contractimpl]
impl TierBadgeContract {
    /// Initialize with an admin and the contract allowed to issue badges
    pub fn initialize(env: Env, admin: Address, minter: Address) -> Result<(), BadgeError> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(BadgeError::AlreadyInitialized);
        }
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Minter, &minter);
        env.storage().instance().set(&DataKey::NextTokenId, &1u32);
        env.storage().instance().set(&DataKey::TotalSupply, &0u32);
        Ok(())
    }

    pub fn set_minter(env: Env, admin: Address, minter: Address) -> Result<(), BadgeError> {
        admin.require_auth();
        let stored: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(BadgeError::NotInitialized)?;
        if stored != admin {
            return Err(BadgeError::Unauthorized);
        }
        env.storage().instance().set(&DataKey::Minter, &minter);
        Ok(())
    }

    /// Mint a badge for `owner`, or raise an existing badge to `tier`.
    /// Lower or equal tiers leave the badge untouched. Returns the token id.
    pub fn issue(env: Env, owner: Address, tier: u32) -> Result<u32, BadgeError> {
        let minter: Address = env
            .storage()
            .instance()
            .get(&DataKey::Minter)
            .ok_or(BadgeError::NotInitialized)?;
        minter.require_auth();

        if tier > MAX_TIER {
            return Err(BadgeError::InvalidTier);
        }

        let now = env.ledger().timestamp();

        if let Some(token_id) = Self::badge_of(env.clone(), owner.clone()) {
            let mut badge = Self::get_badge(env.clone(), token_id)?;
            if tier > badge.tier {
                badge.tier = tier;
                badge.upgraded_at = now;
                env.storage()
                    .persistent()
                    .set(&DataKey::Badge(token_id), &badge);
                env.events().publish(
                    (symbol_short!("badge"), symbol_short!("upgrade")),
                    (owner, token_id, tier),
                );
            }
            return Ok(token_id);
        }

        let token_id: u32 = env
            .storage()
            .instance()
            .get(&DataKey::NextTokenId)
            .unwrap_or(1);

        let badge = TierBadge {
            token_id,
            owner: owner.clone(),
            tier,
            issued_at: now,
            upgraded_at: now,
        };
        env.storage()
            .persistent()
            .set(&DataKey::Badge(token_id), &badge);
        env.storage()
            .persistent()
            .set(&DataKey::BadgeOf(owner.clone()), &token_id);

        env.storage()
            .instance()
            .set(&DataKey::NextTokenId, &(token_id + 1));
        let total = Self::total_supply(env.clone());
        env.storage()
            .instance()
            .set(&DataKey::TotalSupply, &(total + 1));

        env.events().publish(
            (symbol_short!("badge"), symbol_short!("mint")),
            (owner, token_id, tier),
        );

        Ok(token_id)
    }

    pub fn badge_of(env: Env, owner: Address) -> Option<u32> {
        env.storage().persistent().get(&DataKey::BadgeOf(owner))
    }

    pub fn owner_of(env: Env, token_id: u32) -> Result<Address, BadgeError> {
        Ok(Self::get_badge(env, token_id)?.owner)
    }

    pub fn get_badge(env: Env, token_id: u32) -> Result<TierBadge, BadgeError> {
        env.storage()
            .persistent()
            .get(&DataKey::Badge(token_id))
            .ok_or(BadgeError::NotFound)
    }

    pub fn total_supply(env: Env) -> u32 {
        env.storage().instance().get(&DataKey::TotalSupply).unwrap_or(0)
    }
}

mod test;
