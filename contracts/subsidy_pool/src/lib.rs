#![no_std]
use soroban_sdk::{
    contract, contractclient, contracterror, contractimpl, contracttype, log, symbol_short,
    token, Address, Env,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum SubsidyError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    InsufficientSkim = 5,
    ExchangeNotConfigured = 6,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub admin: Address,
    pub staking_token: Address,
    pub payout_token: Address,
    pub staking_ledger: Address,
    pub policy_ledger: Address,
    pub exchange: Option<Address>,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PoolState {
    /// Staking asset waiting to be converted.
    pub skim_balance: i128,
    /// Payout asset available for free policies.
    pub payout_balance: i128,
    pub policies_funded: u64,
    pub total_skim_received: i128,
    pub total_subsidies_paid: i128,
}

#[contracttype]
pub enum DataKey {
    Config,
    State,
}

/// Converts the staking asset into the payout asset.
#[contractclient(name = "AssetExchangeClient")]
pub trait AssetExchange {
    /// Staking asset for `amount` is already in the exchange's account.
    /// Sends the payout asset to `recipient` and returns how much was sent.
    fn exchange(env: Env, recipient: Address, amount: i128) -> i128;
}

const DAY_IN_LEDGERS: u32 = 17_280;
const BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const LIFETIME_THRESHOLD: u32 = BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contract]
pub struct SubsidyPoolContract;

#[contractimpl]
impl SubsidyPoolContract {
    pub fn initialize(
        env: Env,
        admin: Address,
        staking_token: Address,
        payout_token: Address,
        staking_ledger: Address,
        policy_ledger: Address,
    ) -> Result<(), SubsidyError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(SubsidyError::AlreadyInitialized);
        }
        admin.require_auth();

        env.storage().instance().set(
            &DataKey::Config,
            &Config {
                admin,
                staking_token,
                payout_token,
                staking_ledger,
                policy_ledger,
                exchange: None,
            },
        );
        env.storage()
            .instance()
            .set(&DataKey::State, &PoolState::default());
        bump(&env);
        Ok(())
    }

    /// Record yield spread the staking ledger has already transferred in.
    pub fn deposit_skim(env: Env, amount: i128) -> Result<(), SubsidyError> {
        let config = load_config(&env)?;
        config.staking_ledger.require_auth();
        if amount <= 0 {
            return Err(SubsidyError::InvalidAmount);
        }

        let mut state = load_state(&env);
        state.skim_balance += amount;
        state.total_skim_received += amount;
        env.storage().instance().set(&DataKey::State, &state);

        env.events()
            .publish((symbol_short!("subsidy"), symbol_short!("skim")), amount);
        bump(&env);
        Ok(())
    }

    pub fn deposit_payout(env: Env, from: Address, amount: i128) -> Result<(), SubsidyError> {
        from.require_auth();
        if amount <= 0 {
            return Err(SubsidyError::InvalidAmount);
        }
        let config = load_config(&env)?;

        token::Client::new(&env, &config.payout_token).transfer(
            &from,
            &env.current_contract_address(),
            &amount,
        );

        let mut state = load_state(&env);
        state.payout_balance += amount;
        env.storage().instance().set(&DataKey::State, &state);

        env.events().publish(
            (symbol_short!("subsidy"), symbol_short!("funded")),
            (from, amount),
        );
        bump(&env);
        Ok(())
    }

    pub fn set_exchange(env: Env, admin: Address, exchange: Address) -> Result<(), SubsidyError> {
        let mut config = require_admin(&env, &admin)?;
        config.exchange = Some(exchange);
        env.storage().instance().set(&DataKey::Config, &config);
        Ok(())
    }

    /// Swap `amount` of accumulated skim into the payout asset.
    pub fn convert_skim(env: Env, admin: Address, amount: i128) -> Result<i128, SubsidyError> {
        let config = require_admin(&env, &admin)?;
        let exchange = config
            .exchange
            .ok_or(SubsidyError::ExchangeNotConfigured)?;
        if amount <= 0 {
            return Err(SubsidyError::InvalidAmount);
        }

        let mut state = load_state(&env);
        if amount > state.skim_balance {
            return Err(SubsidyError::InsufficientSkim);
        }
        state.skim_balance -= amount;
        env.storage().instance().set(&DataKey::State, &state);

        let pool = env.current_contract_address();
        token::Client::new(&env, &config.staking_token).transfer(&pool, &exchange, &amount);
        let received = AssetExchangeClient::new(&env, &exchange).exchange(&pool, &amount);

        let mut state = load_state(&env);
        state.payout_balance += received;
        env.storage().instance().set(&DataKey::State, &state);

        env.events().publish(
            (symbol_short!("subsidy"), symbol_short!("convert")),
            (amount, received),
        );
        Ok(received)
    }

    /// Pay `premium` to the policy ledger on behalf of `staker`.
    /// Returns false when the payout balance cannot cover it. A zero
    /// premium is funded without touching the pool.
    pub fn fund_policy(env: Env, staker: Address, premium: i128) -> Result<bool, SubsidyError> {
        let config = load_config(&env)?;
        config.policy_ledger.require_auth();
        if premium < 0 {
            return Err(SubsidyError::InvalidAmount);
        }
        if premium == 0 {
            return Ok(true);
        }

        let mut state = load_state(&env);
        if state.payout_balance < premium {
            log!(&env, "subsidy balance short of premium", state.payout_balance, premium);
            return Ok(false);
        }

        state.payout_balance -= premium;
        state.policies_funded += 1;
        state.total_subsidies_paid += premium;
        env.storage().instance().set(&DataKey::State, &state);

        token::Client::new(&env, &config.payout_token).transfer(
            &env.current_contract_address(),
            &config.policy_ledger,
            &premium,
        );

        env.events().publish(
            (symbol_short!("subsidy"), symbol_short!("policy")),
            (staker, premium),
        );
        bump(&env);
        Ok(true)
    }

    pub fn can_fund(env: Env, premium: i128) -> bool {
        premium >= 0 && load_state(&env).payout_balance >= premium
    }

    pub fn get_state(env: Env) -> PoolState {
        load_state(&env)
    }

    pub fn get_config(env: Env) -> Result<Config, SubsidyError> {
        load_config(&env)
    }
}

fn load_config(env: &Env) -> Result<Config, SubsidyError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(SubsidyError::NotInitialized)
}

fn load_state(env: &Env) -> PoolState {
    env.storage()
        .instance()
        .get(&DataKey::State)
        .unwrap_or_default()
}

fn require_admin(env: &Env, admin: &Address) -> Result<Config, SubsidyError> {
    admin.require_auth();
    let config = load_config(env)?;
    if config.admin != *admin {
        return Err(SubsidyError::Unauthorized);
    }
    Ok(config)
}

fn bump(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(LIFETIME_THRESHOLD, BUMP_AMOUNT);
}
