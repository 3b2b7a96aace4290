#![no_std]

use soroban_sdk::{contract, contractimpl, log, symbol_short, token, Address, Env};

mod interfaces;
pub mod types;

use interfaces::{SubsidySinkClient, TierBadgeClient, YieldVenueClient};
use types::{Config, DataKey, StakePackage, StakeTier, StakingError, StakingPosition};

const BASIS_POINTS: i128 = 10_000;
const SECONDS_PER_YEAR: i128 = 31_536_000;
/// Share of gross yield routed to the subsidy pool (0.49%).
const SUBSIDY_SPREAD_BPS: i128 = 49;

const UNIT: i128 = 10_000_000;
const DAY: u64 = 86_400;

const DAY_IN_LEDGERS: u32 = 17_280;
const BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const LIFETIME_THRESHOLD: u32 = BUMP_AMOUNT - DAY_IN_LEDGERS;
const POSITION_BUMP_AMOUNT: u32 = 200 * DAY_IN_LEDGERS;
const POSITION_LIFETIME_THRESHOLD: u32 = POSITION_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contract]
pub struct StakingContract;

#[contractimpl]
impl StakingContract {
    pub fn initialize(
        env: Env,
        admin: Address,
        staking_token: Address,
        yield_venue: Address,
        badge: Address,
        allocation_bps: u32,
    ) -> Result<(), StakingError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(StakingError::AlreadyInitialized);
        }
        admin.require_auth();
        validate_allocation(allocation_bps)?;

        let config = Config {
            admin,
            staking_token,
            yield_venue,
            badge,
            allocation_bps,
            policy_ledger: None,
            subsidy_pool: None,
        };
        env.storage().instance().set(&DataKey::Config, &config);

        for tier in StakeTier::ALL {
            env.storage()
                .instance()
                .set(&DataKey::Package(tier), &default_package(tier));
        }
        bump_instance(&env);

        Ok(())
    }

    // ───────────── POSITIONS ─────────────

    /// Lock `amount` of the staking asset. Returns the resulting tier.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<StakeTier, StakingError> {
        staker.require_auth();
        if amount <= 0 {
            return Err(StakingError::InvalidAmount);
        }

        let config = load_config(&env)?;
        let now = env.ledger().timestamp();

        let existing = load_position(&env, &staker).filter(|p| p.active);
        let mut position = match existing.clone() {
            Some(mut position) => {
                accrue(&env, &config, &mut position)?;
                position
            }
            None => fresh_position(&env, &staker),
        };

        let new_amount = position
            .amount
            .checked_add(amount)
            .ok_or(StakingError::ArithmeticOverflow)?;
        let new_tier = tier_for(&env, new_amount).ok_or(StakingError::AmountBelowMinimum)?;
        let deploy = amount
            .checked_mul(config.allocation_bps as i128)
            .ok_or(StakingError::ArithmeticOverflow)?
            / BASIS_POINTS;

        let upgraded = match &existing {
            Some(previous) => new_tier > previous.tier,
            None => true,
        };

        position.amount = new_amount;
        position.deployed += deploy;
        position.tier = new_tier;
        if upgraded {
            let package = load_package(&env, new_tier)?;
            position.yield_rate_bps = package.yield_rate_bps;
            position.unlock_time = now + package.lock_duration;
            position.claims_allowed = position.claims_allowed.max(package.free_claims);
        }
        store_position(&env, &position);
        add_total_staked(&env, amount);

        let token = token::Client::new(&env, &config.staking_token);
        token.transfer(&staker, &env.current_contract_address(), &amount);
        if deploy > 0 {
            token.transfer(&env.current_contract_address(), &config.yield_venue, &deploy);
            YieldVenueClient::new(&env, &config.yield_venue).deposit(&deploy);
        }

        if upgraded && new_tier >= StakeTier::Silver {
            TierBadgeClient::new(&env, &config.badge).issue(&staker, &new_tier.index());
            env.events().publish(
                (symbol_short!("stake"), symbol_short!("upgrade")),
                (staker.clone(), new_tier.index()),
            );
        }

        env.events().publish(
            (symbol_short!("stake"), symbol_short!("staked")),
            (staker, amount, new_amount),
        );
        bump_instance(&env);

        Ok(new_tier)
    }

    /// Release `amount` back to the staker once the lock has passed.
    pub fn unstake(env: Env, staker: Address, amount: i128) -> Result<(), StakingError> {
        staker.require_auth();
        if amount <= 0 {
            return Err(StakingError::InvalidAmount);
        }

        let config = load_config(&env)?;
        let mut position = load_position(&env, &staker)
            .filter(|p| p.active)
            .ok_or(StakingError::NoActivePosition)?;

        if amount > position.amount {
            return Err(StakingError::InsufficientStake);
        }
        if env.ledger().timestamp() < position.unlock_time {
            return Err(StakingError::StillLocked);
        }

        accrue(&env, &config, &mut position)?;

        let remaining = position.amount - amount;
        let released = if remaining == 0 {
            position.deployed
        } else {
            position
                .deployed
                .checked_mul(amount)
                .ok_or(StakingError::ArithmeticOverflow)?
                / position.amount
        };

        position.amount = remaining;
        position.deployed -= released;
        if remaining == 0 {
            position.active = false;
        } else {
            // Remainders must still qualify for a package.
            let new_tier = tier_for(&env, remaining).ok_or(StakingError::AmountBelowMinimum)?;
            if new_tier < position.tier {
                let package = load_package(&env, new_tier)?;
                position.claims_allowed = position.claims_used.max(package.free_claims);
                log!(&env, "stake downgraded to tier", new_tier.index());
            }
            position.tier = new_tier;
        }
        store_position(&env, &position);
        add_total_staked(&env, -amount);

        if released > 0 {
            let received = YieldVenueClient::new(&env, &config.yield_venue)
                .withdraw(&released, &env.current_contract_address());
            if received < released {
                return Err(StakingError::VenueShortfall);
            }
        }
        token::Client::new(&env, &config.staking_token).transfer(
            &env.current_contract_address(),
            &staker,
            &amount,
        );

        env.events().publish(
            (symbol_short!("stake"), symbol_short!("unstaked")),
            (staker, amount, remaining),
        );
        bump_instance(&env);

        Ok(())
    }

    /// Pay out accrued yield, less the subsidy spread, up to the interest the
    /// venue has actually earned. Returns the net amount.
    pub fn claim_yield(env: Env, staker: Address) -> Result<i128, StakingError> {
        staker.require_auth();

        let config = load_config(&env)?;
        let mut position = load_position(&env, &staker).ok_or(StakingError::NoActivePosition)?;
        accrue(&env, &config, &mut position)?;

        if position.accrued_yield <= 0 {
            return Err(StakingError::NothingToClaim);
        }

        // Never pay yield out of pooled principal. The rest stays accrued.
        let venue = YieldVenueClient::new(&env, &config.yield_venue);
        let gross = position.accrued_yield.min(venue.accrued_interest());
        if gross <= 0 {
            return Err(StakingError::VenueShortfall);
        }

        let skim = match config.subsidy_pool {
            Some(_) => gross * SUBSIDY_SPREAD_BPS / BASIS_POINTS,
            None => 0,
        };
        let net = gross - skim;

        position.accrued_yield -= gross;
        position.total_yield_claimed += net;
        store_position(&env, &position);

        let received = venue.withdraw(&gross, &env.current_contract_address());
        if received < gross {
            return Err(StakingError::VenueShortfall);
        }

        let token = token::Client::new(&env, &config.staking_token);
        if let Some(pool) = config.subsidy_pool.as_ref() {
            if skim > 0 {
                token.transfer(&env.current_contract_address(), pool, &skim);
                SubsidySinkClient::new(&env, pool).deposit_skim(&skim);
            }
        }
        token.transfer(&env.current_contract_address(), &staker, &net);

        env.events().publish(
            (symbol_short!("stake"), symbol_short!("yield")),
            (staker, net, skim),
        );
        bump_instance(&env);

        Ok(net)
    }

    // ───────────── INSURANCE ENTITLEMENT ─────────────

    /// Consume one free policy. Callable only by the policy ledger.
    pub fn register_insurance_claim(env: Env, user: Address) -> Result<u32, StakingError> {
        let config = load_config(&env)?;
        let ledger = config.policy_ledger.ok_or(StakingError::Unauthorized)?;
        ledger.require_auth();

        let mut position = load_position(&env, &user)
            .filter(|p| p.active)
            .ok_or(StakingError::NoFreeClaim)?;
        if position.claims_used >= position.claims_allowed {
            return Err(StakingError::NoFreeClaim);
        }

        position.claims_used += 1;
        store_position(&env, &position);

        env.events().publish(
            (symbol_short!("stake"), symbol_short!("claim")),
            (user, position.claims_used),
        );

        Ok(position.claims_allowed - position.claims_used)
    }

    pub fn has_free_claim(env: Env, user: Address) -> bool {
        match load_position(&env, &user) {
            Some(p) => p.active && p.claims_used < p.claims_allowed,
            None => false,
        }
    }

    // ───────────── ADMIN ─────────────

    pub fn set_package(
        env: Env,
        admin: Address,
        tier: StakeTier,
        package: StakePackage,
    ) -> Result<(), StakingError> {
        require_admin(&env, &admin)?;

        if package.min_stake <= 0 || package.yield_rate_bps as i128 > BASIS_POINTS {
            return Err(StakingError::InvalidPackage);
        }
        if let Some(lower) = tier.prev() {
            if load_package(&env, lower)?.min_stake >= package.min_stake {
                return Err(StakingError::InvalidPackage);
            }
        }
        if let Some(higher) = tier.next() {
            if load_package(&env, higher)?.min_stake <= package.min_stake {
                return Err(StakingError::InvalidPackage);
            }
        }

        env.storage()
            .instance()
            .set(&DataKey::Package(tier), &package);
        env.events().publish(
            (symbol_short!("stake"), symbol_short!("package")),
            (tier.index(), package.min_stake, package.yield_rate_bps),
        );
        Ok(())
    }

    pub fn set_policy_ledger(env: Env, admin: Address, ledger: Address) -> Result<(), StakingError> {
        let mut config = require_admin(&env, &admin)?;
        if config.policy_ledger.is_some() {
            return Err(StakingError::AlreadyConfigured);
        }
        config.policy_ledger = Some(ledger);
        env.storage().instance().set(&DataKey::Config, &config);
        Ok(())
    }

    pub fn set_subsidy_pool(env: Env, admin: Address, pool: Address) -> Result<(), StakingError> {
        let mut config = require_admin(&env, &admin)?;
        if config.subsidy_pool.is_some() {
            return Err(StakingError::AlreadyConfigured);
        }
        config.subsidy_pool = Some(pool);
        env.storage().instance().set(&DataKey::Config, &config);
        Ok(())
    }

    /// Applies to future stakes only.
    pub fn set_allocation(env: Env, admin: Address, allocation_bps: u32) -> Result<(), StakingError> {
        let mut config = require_admin(&env, &admin)?;
        validate_allocation(allocation_bps)?;
        config.allocation_bps = allocation_bps;
        env.storage().instance().set(&DataKey::Config, &config);
        Ok(())
    }

    // ───────────── QUERIES ─────────────

    pub fn get_position(env: Env, user: Address) -> Option<StakingPosition> {
        load_position(&env, &user)
    }

    pub fn get_package(env: Env, tier: StakeTier) -> Result<StakePackage, StakingError> {
        load_package(&env, tier)
    }

    /// Claimable yield as of now, before the subsidy spread.
    pub fn pending_yield(env: Env, user: Address) -> Result<i128, StakingError> {
        let config = load_config(&env)?;
        match load_position(&env, &user) {
            Some(mut position) => {
                accrue(&env, &config, &mut position)?;
                Ok(position.accrued_yield)
            }
            None => Ok(0),
        }
    }

    pub fn tier_for_amount(env: Env, amount: i128) -> Option<StakeTier> {
        tier_for(&env, amount)
    }

    pub fn get_total_staked(env: Env) -> i128 {
        env.storage()
            .instance()
            .get(&DataKey::TotalStaked)
            .unwrap_or(0)
    }

    pub fn get_config(env: Env) -> Result<Config, StakingError> {
        load_config(&env)
    }
}

// ───────────── HELPERS ─────────────

fn default_package(tier: StakeTier) -> StakePackage {
    let (min_stake, lock_days, yield_rate_bps, free_claims) = match tier {
        StakeTier::Basic => (100, 7, 400, 0),
        StakeTier::Silver => (500, 30, 500, 1),
        StakeTier::Gold => (1_000, 90, 600, 2),
        StakeTier::Platinum => (2_000, 180, 800, 4),
    };
    StakePackage {
        min_stake: min_stake * UNIT,
        lock_duration: lock_days * DAY,
        yield_rate_bps,
        free_claims,
        active: true,
    }
}

fn fresh_position(env: &Env, staker: &Address) -> StakingPosition {
    let now = env.ledger().timestamp();
    let previous = load_position(env, staker);
    StakingPosition {
        staker: staker.clone(),
        amount: 0,
        deployed: 0,
        tier: StakeTier::Basic,
        stake_start: now,
        unlock_time: now,
        yield_rate_bps: 0,
        // Free claims are per account, not per position.
        claims_used: previous.as_ref().map_or(0, |p| p.claims_used),
        claims_allowed: previous.as_ref().map_or(0, |p| p.claims_allowed),
        // Unclaimed yield from an earlier position stays claimable.
        accrued_yield: previous.as_ref().map_or(0, |p| p.accrued_yield),
        last_accrual: now,
        total_yield_claimed: previous.map_or(0, |p| p.total_yield_claimed),
        active: true,
    }
}

/// Highest active package whose minimum the amount reaches.
fn tier_for(env: &Env, amount: i128) -> Option<StakeTier> {
    StakeTier::ALL.iter().rev().copied().find(|tier| {
        env.storage()
            .instance()
            .get::<_, StakePackage>(&DataKey::Package(*tier))
            .map_or(false, |p| p.active && amount >= p.min_stake)
    })
}

/// Checkpoint simple interest on the deployed principal up to now.
fn accrue(env: &Env, config: &Config, position: &mut StakingPosition) -> Result<(), StakingError> {
    let now = env.ledger().timestamp();
    let elapsed = now.saturating_sub(position.last_accrual);
    position.last_accrual = now;

    if elapsed == 0 || position.deployed <= 0 || position.yield_rate_bps == 0 {
        return Ok(());
    }

    let venue_rate = YieldVenueClient::new(env, &config.yield_venue).current_rate();
    let rate = position.yield_rate_bps.min(venue_rate) as i128;

    let earned = position
        .deployed
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(elapsed as i128))
        .ok_or(StakingError::ArithmeticOverflow)?
        / (BASIS_POINTS * SECONDS_PER_YEAR);

    position.accrued_yield = position
        .accrued_yield
        .checked_add(earned)
        .ok_or(StakingError::ArithmeticOverflow)?;
    Ok(())
}

fn validate_allocation(allocation_bps: u32) -> Result<(), StakingError> {
    if allocation_bps == 0 || allocation_bps as i128 > BASIS_POINTS {
        return Err(StakingError::InvalidAmount);
    }
    Ok(())
}

fn require_admin(env: &Env, admin: &Address) -> Result<Config, StakingError> {
    admin.require_auth();
    let config = load_config(env)?;
    if config.admin != *admin {
        return Err(StakingError::Unauthorized);
    }
    Ok(config)
}

fn load_config(env: &Env) -> Result<Config, StakingError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(StakingError::NotInitialized)
}

fn load_package(env: &Env, tier: StakeTier) -> Result<StakePackage, StakingError> {
    env.storage()
        .instance()
        .get(&DataKey::Package(tier))
        .ok_or(StakingError::NotInitialized)
}

fn load_position(env: &Env, staker: &Address) -> Option<StakingPosition> {
    env.storage()
        .persistent()
        .get(&DataKey::Position(staker.clone()))
}

fn store_position(env: &Env, position: &StakingPosition) {
    let key = DataKey::Position(position.staker.clone());
    env.storage().persistent().set(&key, position);
    env.storage()
        .persistent()
        .extend_ttl(&key, POSITION_LIFETIME_THRESHOLD, POSITION_BUMP_AMOUNT);
}

fn add_total_staked(env: &Env, delta: i128) {
    let total: i128 = env
        .storage()
        .instance()
        .get(&DataKey::TotalStaked)
        .unwrap_or(0);
    env.storage()
        .instance()
        .set(&DataKey::TotalStaked, &(total + delta));
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(LIFETIME_THRESHOLD, BUMP_AMOUNT);
}
