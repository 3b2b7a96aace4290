#![no_std]

//! Thin wrapper around an external lending pool. The staking ledger is the
//! only owner; it pushes tokens here and the adapter supplies them.

use soroban_sdk::{
    contract, contractclient, contracterror, contractimpl, contracttype, symbol_short, token,
    Address, Env,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum AdapterError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub admin: Address,
    pub owner: Address,
    pub token: Address,
    pub pool: Address,
}

#[contracttype]
pub enum DataKey {
    Config,
    Principal,
}

#[contractclient(name = "LendingPoolClient")]
pub trait LendingPool {
    /// Credit `from` with `amount` already transferred to the pool.
    fn supply(env: Env, from: Address, amount: i128);
    /// Send up to `amount` of the caller's supply to `to`; returns what was sent.
    fn withdraw(env: Env, to: Address, amount: i128) -> i128;
    fn balance_of(env: Env, account: Address) -> i128;
    fn supply_rate_bps(env: Env) -> u32;
}

const DAY_IN_LEDGERS: u32 = 17_280;
const BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const LIFETIME_THRESHOLD: u32 = BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contract]
pub struct YieldAdapterContract;

#[contractimpl]
impl YieldAdapterContract {
    pub fn initialize(
        env: Env,
        admin: Address,
        owner: Address,
        token: Address,
        pool: Address,
    ) -> Result<(), AdapterError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(AdapterError::AlreadyInitialized);
        }
        admin.require_auth();

        env.storage().instance().set(
            &DataKey::Config,
            &Config {
                admin,
                owner,
                token,
                pool,
            },
        );
        env.storage().instance().set(&DataKey::Principal, &0i128);
        env.storage()
            .instance()
            .extend_ttl(LIFETIME_THRESHOLD, BUMP_AMOUNT);
        Ok(())
    }

    pub fn deposit(env: Env, amount: i128) -> Result<(), AdapterError> {
        let config = Self::get_config(env.clone())?;
        config.owner.require_auth();
        if amount <= 0 {
            return Err(AdapterError::InvalidAmount);
        }

        let principal = Self::get_principal(env.clone());
        env.storage()
            .instance()
            .set(&DataKey::Principal, &(principal + amount));

        let adapter = env.current_contract_address();
        token::Client::new(&env, &config.token).transfer(&adapter, &config.pool, &amount);
        LendingPoolClient::new(&env, &config.pool).supply(&adapter, &amount);

        env.events()
            .publish((symbol_short!("yield"), symbol_short!("deposit")), amount);
        env.storage()
            .instance()
            .extend_ttl(LIFETIME_THRESHOLD, BUMP_AMOUNT);
        Ok(())
    }

    /// Pull `amount` out of the pool straight to `recipient`. Interest is
    /// consumed before principal. Returns the amount the pool released.
    pub fn withdraw(env: Env, amount: i128, recipient: Address) -> Result<i128, AdapterError> {
        let config = Self::get_config(env.clone())?;
        config.owner.require_auth();
        if amount <= 0 {
            return Err(AdapterError::InvalidAmount);
        }

        let pool = LendingPoolClient::new(&env, &config.pool);
        let interest = Self::accrued_interest(env.clone())?;
        let withdrawn = pool.withdraw(&recipient, &amount);

        let from_principal = (withdrawn - interest).max(0);
        let principal = Self::get_principal(env.clone());
        env.storage()
            .instance()
            .set(&DataKey::Principal, &(principal - from_principal).max(0));

        env.events().publish(
            (symbol_short!("yield"), symbol_short!("withdraw")),
            (recipient, withdrawn),
        );
        Ok(withdrawn)
    }

    pub fn current_balance(env: Env) -> Result<i128, AdapterError> {
        let config = Self::get_config(env.clone())?;
        Ok(LendingPoolClient::new(&env, &config.pool).balance_of(&env.current_contract_address()))
    }

    pub fn current_rate(env: Env) -> Result<u32, AdapterError> {
        let config = Self::get_config(env.clone())?;
        Ok(LendingPoolClient::new(&env, &config.pool).supply_rate_bps())
    }

    pub fn accrued_interest(env: Env) -> Result<i128, AdapterError> {
        let balance = Self::current_balance(env.clone())?;
        Ok((balance - Self::get_principal(env)).max(0))
    }

    pub fn get_principal(env: Env) -> i128 {
        env.storage()
            .instance()
            .get(&DataKey::Principal)
            .unwrap_or(0)
    }

    pub fn get_config(env: Env) -> Result<Config, AdapterError> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(AdapterError::NotInitialized)
    }
}

#[cfg(test)]
mod test;
